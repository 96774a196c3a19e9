/// Page script: every control posts JSON and the live-reload socket
/// refreshes the page once the server has applied it.
pub(super) const EDITOR_JS: &str = r#"<script>
(function() {
  function post(path, body) {
    return fetch(path, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body)
    }).then(function(r) { return r.json(); })
      .then(function(resp) {
        if (!resp.ok && resp.error) showError(resp.error);
        return resp;
      })
      .catch(function(e) { showError(String(e)); });
  }

  function showError(msg) {
    var bar = document.getElementById('error-bar');
    var text = document.getElementById('error-text');
    if (!bar || !text) return;
    text.textContent = msg;
    bar.style.display = 'flex';
  }

  function flash(btn, label) {
    var orig = btn.textContent;
    btn.textContent = label;
    btn.classList.add('copied');
    setTimeout(function() {
      btn.textContent = orig;
      btn.classList.remove('copied');
    }, 1200);
  }

  // clipboard access is refused outside secure contexts; leave the code
  // selected so it can be copied by hand
  function selectForCopy(btn) {
    var code = document.getElementById('embed-code');
    if (code) {
      code.focus();
      code.select();
    }
    flash(btn, 'press Ctrl+C');
  }

  function copyText(text, btn) {
    if (!navigator.clipboard || !navigator.clipboard.writeText) {
      selectForCopy(btn);
      return;
    }
    navigator.clipboard.writeText(text).then(function() {
      flash(btn, 'copied');
    }).catch(function() {
      selectForCopy(btn);
    });
  }

  var addForm = document.getElementById('add-image');
  if (addForm) {
    addForm.addEventListener('submit', function(e) {
      e.preventDefault();
      var input = document.getElementById('image-url');
      var url = input.value;
      input.value = '';
      document.getElementById('loading').classList.add('on');
      post('/images', { url: url });
    });
  }

  document.querySelectorAll('[data-remove]').forEach(function(btn) {
    btn.addEventListener('click', function() {
      post('/images/remove', { id: btn.getAttribute('data-remove') });
    });
  });

  document.querySelectorAll('[data-setting]').forEach(function(input) {
    var hint = document.getElementById(input.id + '-value');
    input.addEventListener('input', function() {
      if (hint && input.type === 'range') hint.textContent = input.value;
    });
    input.addEventListener('change', function() {
      var patch = {};
      var key = input.getAttribute('data-setting');
      patch[key] = input.type === 'color' || input.type === 'text'
        ? input.value
        : Number(input.value);
      post('/settings', patch);
    });
  });

  var copyBtn = document.getElementById('copy-embed');
  if (copyBtn) {
    copyBtn.addEventListener('click', function() {
      copyText(document.getElementById('embed-code').value, copyBtn);
    });
  }

  var dismiss = document.getElementById('error-dismiss');
  if (dismiss) {
    dismiss.addEventListener('click', function() {
      document.getElementById('error-bar').style.display = 'none';
      post('/error/clear', {});
    });
  }
})();
</script>"#;
