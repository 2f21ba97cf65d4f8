//! Embedded HTML/CSS/JS frontend for the cloudcost web dashboard.
//!
//! The entire page is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies. All number and
//! date formatting happens server-side; the page only lays out the
//! rendered view it receives from `/api/state`.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Cloud Cost Optimizer</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --blue: #58a6ff;
  --green: #3fb950;
  --orange: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Layout */
.app { max-width: 1200px; margin: 0 auto; padding: 24px; }
header { margin-bottom: 24px; padding-bottom: 16px; border-bottom: 1px solid var(--border); }
header h1 { font-size: 24px; font-weight: 600; }
header .subtitle { color: var(--text-muted); font-size: 13px; }
.grid { display: grid; grid-template-columns: 320px 1fr; gap: 24px; }
@media (max-width: 860px) { .grid { grid-template-columns: 1fr; } }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 16px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; margin-bottom: 12px; }
.card h3 { font-size: 14px; margin-bottom: 10px; }
.muted { color: var(--text-muted); }

/* Upload */
.drop {
  display: block;
  border: 1px dashed var(--border);
  border-radius: var(--radius);
  padding: 20px;
  text-align: center;
  cursor: pointer;
}
.drop input { display: none; }
.file-name { color: var(--green); font-weight: 600; word-break: break-all; }
button {
  width: 100%;
  margin-top: 10px;
  padding: 9px 12px;
  border: none;
  border-radius: var(--radius);
  font-weight: 600;
  cursor: pointer;
  color: #fff;
}
button:disabled { opacity: 0.4; cursor: not-allowed; }
#btn-predict { background: var(--blue); }
#btn-waste { background: var(--orange); }
.secondary { background: transparent; border: 1px solid var(--border); color: var(--text); }

/* Results */
.results-head { display: flex; justify-content: space-between; align-items: center; margin-bottom: 12px; }
.results-head h2 { font-size: 20px; }
.badge { font-size: 12px; padding: 2px 8px; border-radius: 10px; border: 1px solid var(--border); }
.summary { display: grid; grid-template-columns: repeat(3, 1fr); gap: 12px; margin-bottom: 16px; }
.summary .card { margin-bottom: 0; border-top: 3px solid var(--tone); }
.summary .value { font-size: 22px; font-weight: 700; color: var(--tone); }
.tone-blue { --tone: var(--blue); }
.tone-green { --tone: var(--green); }
.tone-purple { --tone: var(--purple); }
.tone-orange { --tone: var(--orange); }
.tone-red { --tone: var(--red); }

table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; font-size: 12px; }
.meter { display: flex; align-items: center; gap: 8px; }
.meter .track { flex: 1; height: 6px; background: var(--border); border-radius: 3px; min-width: 60px; }
.meter .fill { height: 6px; background: var(--accent); border-radius: 3px; }
.meter span { font-size: 12px; white-space: nowrap; }
.trend { margin-top: 10px; }
.risk-high { color: var(--red); }
.risk-medium { color: var(--orange); }
.risk-low { color: var(--green); }
.rec { display: flex; gap: 10px; padding: 6px 0; }
.error-card { border-color: var(--red); }
.error-card h3 { color: var(--red); }
.actions { display: flex; gap: 10px; }
.actions button { width: auto; }
#toast {
  position: fixed; bottom: 20px; right: 20px;
  background: var(--surface); border: 1px solid var(--border);
  border-radius: var(--radius); padding: 10px 14px; display: none;
}
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>Cloud Cost Optimizer</h1>
    <div class="subtitle">Predict next week's spend and find idle resources from a usage CSV</div>
  </header>

  <div class="grid">
    <div>
      <div class="card">
        <h2>Upload Data</h2>
        <label class="drop">
          <input type="file" id="file" accept=".csv">
          <div id="file-label">
            <div>Select CSV File</div>
            <div class="muted">Cloud usage export (.csv)</div>
          </div>
        </label>
        <button id="btn-predict" disabled>Predict Cost</button>
        <button id="btn-waste" disabled>Detect Waste</button>
      </div>
      <div class="card">
        <h3>💡 Tip</h3>
        <p class="muted">Include timestamps, CPU and memory utilisation, and cost per period for the most accurate analysis.</p>
      </div>
    </div>

    <div id="results"></div>
  </div>
</div>
<div id="toast"></div>

<script>
let state = null;

async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body !== undefined) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const data = await res.json();
  if (!res.ok) throw new Error(data.error || res.statusText);
  return data;
}

function toast(msg) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.style.display = 'block';
  setTimeout(() => { el.style.display = 'none'; }, 2500);
}

function esc(s) {
  const d = document.createElement('div');
  d.textContent = s == null ? '' : String(s);
  return d.innerHTML;
}

function meter(m) {
  return `<div class="meter"><div class="track"><div class="fill" style="width:${m.fill}%"></div></div><span>${esc(m.label)}</span></div>`;
}

function summary(cards) {
  return '<div class="summary">' + cards.map(c => `
    <div class="card tone-${c.tone}">
      <div class="muted">${esc(c.title)}</div>
      <div class="value">${esc(c.value)}</div>
      <div class="muted">${esc(c.subtitle)}</div>
    </div>`).join('') + '</div>';
}

function header(h) {
  return `<div class="results-head">
    <div><h2>${esc(h.title)}</h2><div class="muted">Analysis completed at ${esc(h.completed_at)}</div></div>
    <span class="badge">${esc(h.badge)}</span>
  </div>`;
}

function actions() {
  return `<div class="actions">
    <button class="secondary" onclick="downloadReport()">Download Report</button>
    <button class="secondary" onclick="copyResults()">Copy Results</button>
  </div>`;
}

function renderPrediction(v) {
  const rows = v.forecast.map(r => `<tr>
    <td>${esc(r.date)}</td><td>${esc(r.day)}</td><td>${esc(r.cost)}</td>
    <td>${meter(r.cpu)}</td><td>${meter(r.memory)}</td></tr>`).join('');
  const opps = v.empty_note
    ? `<p class="muted">${esc(v.empty_note)}</p>`
    : v.opportunities.map(o => `<div class="rec">
        <span>${esc(o.icon || '')}</span>
        <div style="flex:1"><strong>${esc(o.label)}</strong> · ${esc(o.savings)}${meter(o.confidence)}</div>
      </div>`).join('');
  const p = v.performance;
  return header(v.header) + summary(v.summary) + `
    <div class="card"><h3>📊 Cost Predictions (Next 7 Days)</h3>
      <table><thead><tr><th>Date</th><th>Day</th><th>Cost</th><th>CPU</th><th>Memory</th></tr></thead>
      <tbody>${rows}</tbody></table>
      <div class="trend">📈 ${esc(v.trend.label)} <span class="muted">(${esc(v.trend.confidence)} confidence)</span></div>
    </div>
    <div class="card"><h3>⚡ Performance Predictions</h3>
      <div>Peak CPU ${meter(p.peak_cpu)}</div>
      <div>Peak Memory ${meter(p.peak_memory)}</div>
      <div>Bottleneck Risk <strong class="risk-${esc(p.risk)}">${esc(p.risk)}</strong></div>
      <div class="muted">${esc(p.peak_time)}</div>
    </div>
    <div class="card"><h3>🎯 Optimization Opportunities</h3>${opps}</div>` + actions();
}

function renderWaste(v) {
  const rows = v.idle.rows.map(r => `<tr>
    <td>${esc(r.start)} → ${esc(r.end)}</td><td>${esc(r.duration)}</td>
    <td>${meter(r.cpu)}</td><td>${meter(r.memory)}</td><td>${esc(r.wasted_cost)}</td></tr>`).join('');
  const overflow = v.idle.overflow ? `<p class="muted">${esc(v.idle.overflow)}</p>` : '';
  const recs = v.recommendations.map(r => `<div class="rec"><span>${esc(r.icon)}</span><span>${esc(r.text)}</span></div>`).join('');
  return header(v.header) + summary(v.summary) + `
    <div class="card"><h3>⏰ Idle Periods Detected</h3>
      <p class="muted">${esc(v.idle.subtitle)}</p>
      <table><thead><tr><th>Period</th><th>Duration</th><th>Avg CPU</th><th>Avg Memory</th><th>Wasted Cost</th></tr></thead>
      <tbody>${rows}</tbody></table>${overflow}
    </div>
    <div class="card"><h3>📊 Waste Analysis</h3>
      <div>Underutilization Score ${meter(v.analysis.score)}</div>
      <div>Total Waste Percentage <strong>${esc(v.analysis.waste_percentage)}</strong></div>
    </div>
    <div class="card"><h3>🚀 Optimization Recommendations</h3>${recs}</div>` + actions();
}

function render() {
  const el = document.getElementById('results');
  document.getElementById('btn-predict').disabled = !state.can_run;
  document.getElementById('btn-waste').disabled = !state.can_run;
  if (state.file_name) {
    document.getElementById('file-label').innerHTML =
      `<div class="file-name">${esc(state.file_name)}</div><div class="muted">Click to choose another file</div>`;
  }

  if (state.display === 'loading') {
    el.innerHTML = `<div class="card"><h3>Analyzing your cloud data</h3>
      <p class="muted">This may take a moment while we process your file...</p></div>`;
  } else if (state.display === 'error') {
    el.innerHTML = `<div class="card error-card"><h3>⚠ Error</h3><p>${esc(state.error)}</p></div>`;
  } else if (state.display === 'result') {
    el.innerHTML = state.view.kind === 'prediction' ? renderPrediction(state.view) : renderWaste(state.view);
  } else {
    el.innerHTML = `<div class="card"><h3>Ready to Optimize</h3>
      <p class="muted">Upload your cloud cost CSV file and click "Predict Cost" or "Detect Waste" to get started with optimization.</p></div>`;
  }
}

async function runAction(path) {
  state = Object.assign({}, state, { display: 'loading', can_run: false });
  render();
  try {
    state = await api('POST', path);
  } catch (e) {
    toast(e.message);
    state = await api('GET', '/api/state');
  }
  render();
}

function downloadReport() {
  window.location = '/api/report';
}

async function copyResults() {
  try {
    await navigator.clipboard.writeText(JSON.stringify(state.result, null, 2));
    toast('Results copied to clipboard!');
  } catch (e) {
    console.error('Failed to copy:', e);
  }
}

document.getElementById('file').addEventListener('change', async (ev) => {
  const file = ev.target.files[0];
  if (!file) return;
  try {
    const content = await file.text();
    state = await api('POST', '/api/upload', { name: file.name, content });
    render();
  } catch (e) {
    toast(e.message);
  }
});

document.getElementById('btn-predict').addEventListener('click', () => runAction('/api/predict-cost'));
document.getElementById('btn-waste').addEventListener('click', () => runAction('/api/detect-waste'));

api('GET', '/api/state').then(s => { state = s; render(); });
</script>
</body>
</html>
"##;
