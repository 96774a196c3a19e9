pub(super) fn build_css() -> String {
    r#"* { margin: 0; padding: 0; box-sizing: border-box; }
html, body { width: 100%; height: 100%; background: #0A0A0A; color: #A0A0A0;
  font-family: 'JetBrains Mono', monospace; font-size: 12px; }

/* ── Toolbar ─────────────────────────────────────── */
.toolbar {
  height: 36px; display: flex; align-items: center; padding: 0 14px;
  border-bottom: 1px solid #2A2A2A; font-size: 11px; gap: 10px;
  background: #0A0A0A; user-select: none;
}
.toolbar .label { color: #666; }
.toolbar .tag { color: #D4AF37; font-weight: 600; }
.toolbar .badge {
  color: #A0A0A0; background: #1F1F1F; padding: 2px 8px;
  border-radius: 3px; font-size: 10px;
}
.toolbar .sep { color: #333; }
.toolbar .loading { color: #F59E0B; display: none; }
.toolbar .loading.on { display: inline; }

/* ── Error bar ───────────────────────────────────── */
.error-bar {
  background: rgba(239,68,68,0.06); border-bottom: 1px solid #3F1818;
  padding: 6px 14px; font-size: 11px; color: #EF4444;
  display: flex; align-items: center; gap: 10px;
}
.error-bar button { margin-left: auto; }

/* ── Split view ──────────────────────────────────── */
.split {
  display: grid; grid-template-columns: 1fr 4px 360px;
  height: calc(100vh - 36px);
}
.panel { position: relative; overflow: auto; }
.panel-label {
  font-size: 10px; color: #444; text-transform: uppercase;
  letter-spacing: 1px; margin-bottom: 8px;
}
.divider { background: #2A2A2A; }
.preview-pane { display: flex; flex-direction: column; padding: 12px; gap: 8px; }
.preview-pane iframe {
  flex: 1; width: 100%; border: 1px solid #1F1F1F; border-radius: 4px;
  background: #141414;
}

/* ── Controls ────────────────────────────────────── */
.section { padding: 12px 14px; border-bottom: 1px solid #1F1F1F; }
.row { display: flex; align-items: center; gap: 8px; margin-bottom: 6px; }
.row label { width: 110px; color: #666; }
.row input[type="number"], .row input[type="text"], .row input[type="color"] {
  flex: 1; background: #141414; border: 1px solid #2A2A2A; color: #A0A0A0;
  padding: 3px 6px; border-radius: 3px; font-family: inherit; font-size: 11px;
}
.row input[type="range"] { flex: 1; accent-color: #D4AF37; }
.row .hint { color: #D4AF37; min-width: 90px; font-size: 10px; }
button {
  background: #1F1F1F; border: 1px solid #2A2A2A; color: #A0A0A0;
  padding: 3px 10px; border-radius: 3px; font-size: 10px; cursor: pointer;
  font-family: inherit;
}
button:hover { color: #FFF; border-color: #444; }
button.copied { color: #22C55E; border-color: #22C55E; transition: none; }

/* ── Image list ──────────────────────────────────── */
.image-list { list-style: none; }
.image-list li {
  display: flex; align-items: center; gap: 8px; padding: 4px 0;
  border-bottom: 1px solid #141414;
}
.image-list img { width: 40px; height: 28px; object-fit: cover; border-radius: 2px; }
.image-list .name { flex: 1; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.count { color: #444; font-size: 10px; }
.floor { color: #F59E0B; font-size: 10px; margin-top: 6px; }

/* ── Embed code ──────────────────────────────────── */
.embed-code {
  width: 100%; height: 160px; background: #141414; border: 1px solid #2A2A2A;
  color: #A0A0A0; border-radius: 4px; padding: 8px; font-family: inherit;
  font-size: 10px; resize: vertical; margin-bottom: 6px;
}
"#
    .to_string()
}
