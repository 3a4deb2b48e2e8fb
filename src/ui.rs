use crate::models::SummaryMetrics;

pub fn render_index(company_name: &str, summary: &SummaryMetrics) -> String {
    INDEX_HTML
        .replace("{{COMPANY}}", &escape_html(company_name))
        .replace("{{DATE}}", &summary.date)
        .replace("{{TOTAL}}", &summary.total_employees.to_string())
        .replace("{{PRESENT}}", &summary.present.to_string())
        .replace("{{LATE}}", &summary.late.to_string())
        .replace("{{ON_LEAVE}}", &summary.on_leave.to_string())
        .replace("{{RATE}}", &summary.attendance_rate.to_string())
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{COMPANY}} Attendance</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f1;
      --bg-2: #bfd8cf;
      --ink: #23302c;
      --accent: #2f8f6b;
      --accent-2: #2f4858;
      --warn: #d9822b;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e3efe9 60%, #f4f8f6 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f6b66;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7d8a85;
    }

    .stat .value {
      font-size: 1.7rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .stat .value.late {
      color: var(--warn);
    }

    .session {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: center;
    }

    input {
      flex: 1;
      min-width: 220px;
      border-radius: 999px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 14px 18px;
      font: inherit;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.secondary {
      background: var(--accent-2);
    }

    #week {
      width: 100%;
      height: 220px;
      display: block;
    }

    .bar {
      fill: var(--accent);
    }

    .bar.late {
      fill: var(--warn);
    }

    .chart-label {
      fill: #6f7b76;
      font-size: 11px;
    }

    .status {
      min-height: 1.2em;
      color: #5f6b66;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .feed {
      margin: 0;
      padding: 0;
      list-style: none;
      display: grid;
      gap: 8px;
    }

    .feed li {
      background: white;
      border-radius: 14px;
      padding: 10px 14px;
    }

    [hidden] {
      display: none !important;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>{{COMPANY}}</h1>
      <p class="subtitle">Attendance for {{DATE}}</p>
    </header>

    <section class="panel">
      <div class="stat"><span class="label">Staff</span><span class="value">{{TOTAL}}</span></div>
      <div class="stat"><span class="label">Present</span><span class="value">{{PRESENT}}</span></div>
      <div class="stat"><span class="label">Late</span><span class="value late">{{LATE}}</span></div>
      <div class="stat"><span class="label">On leave</span><span class="value">{{ON_LEAVE}}</span></div>
      <div class="stat"><span class="label">Rate</span><span class="value">{{RATE}}%</span></div>
    </section>

    <section class="session" id="login-box">
      <input id="email" type="email" placeholder="you@company.com" />
      <button id="login-btn" type="button">Sign in</button>
    </section>

    <section class="session" id="clock-box" hidden>
      <span id="who"></span>
      <button id="toggle-btn" type="button">Clock in / out</button>
      <button id="logout-btn" class="secondary" type="button">Sign out</button>
    </section>

    <section id="week-box" hidden>
      <h2>This week</h2>
      <svg id="week" viewBox="0 0 600 220" role="img" aria-label="Weekly attendance"></svg>
    </section>

    <ul class="feed" id="feed"></ul>
    <div class="status" id="status"></div>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const loginBox = document.getElementById('login-box');
    const clockBox = document.getElementById('clock-box');
    const weekBox = document.getElementById('week-box');
    const weekEl = document.getElementById('week');
    const feedEl = document.getElementById('feed');
    let source = null;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const token = () => localStorage.getItem('token');

    const api = async (path, options = {}) => {
      const res = await fetch(path, {
        ...options,
        headers: {
          'content-type': 'application/json',
          authorization: `Bearer ${token()}`
        }
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const renderWeek = (days) => {
      const width = 600;
      const height = 220;
      const slot = width / days.length;
      const max = Math.max(1, ...days.map((day) => day.present + day.absent));
      weekEl.innerHTML = days
        .map((day, index) => {
          const h = ((height - 40) * day.present) / max;
          const lateH = ((height - 40) * day.late) / max;
          const x = index * slot + slot * 0.2;
          return `
            <rect class="bar" x="${x}" y="${height - 24 - h}" width="${slot * 0.6}" height="${h}" />
            <rect class="bar late" x="${x}" y="${height - 24 - lateH}" width="${slot * 0.6}" height="${lateH}" />
            <text class="chart-label" x="${x + slot * 0.3}" y="${height - 6}" text-anchor="middle">${day.weekday}</text>`;
        })
        .join('');
    };

    const pushFeed = (note) => {
      const item = document.createElement('li');
      item.textContent = `${note.title}: ${note.message}`;
      feedEl.prepend(item);
    };

    const enter = async () => {
      const me = await api('/api/me');
      loginBox.hidden = true;
      clockBox.hidden = false;
      document.getElementById('who').textContent = `${me.name} (${me.role})`;
      if (me.role !== 'EMPLOYEE') {
        weekBox.hidden = false;
        renderWeek(await api('/api/analytics/weekly'));
      }
      const notes = await api('/api/notifications');
      feedEl.innerHTML = '';
      notes.slice(0, 10).reverse().forEach(pushFeed);
      source = new EventSource(`/api/events?token=${encodeURIComponent(token())}`);
      source.addEventListener('notification', (event) => pushFeed(JSON.parse(event.data)));
    };

    document.getElementById('login-btn').addEventListener('click', async () => {
      try {
        const email = document.getElementById('email').value;
        const res = await fetch('/api/login', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ email })
        });
        if (!res.ok) {
          throw new Error(await res.text());
        }
        localStorage.setItem('token', (await res.json()).token);
        await enter();
        setStatus('', '');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('toggle-btn').addEventListener('click', async () => {
      try {
        const res = await api('/api/attendance/toggle', { method: 'POST' });
        setStatus(`Clocked ${res.action.toLowerCase()} (${res.record.status})`, 'ok');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    document.getElementById('logout-btn').addEventListener('click', async () => {
      await api('/api/logout', { method: 'POST' }).catch(() => null);
      localStorage.removeItem('token');
      if (source) {
        source.close();
      }
      location.reload();
    });

    if (token()) {
      enter().catch(() => localStorage.removeItem('token'));
    }
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_placeholders_and_escapes_company() {
        let summary = SummaryMetrics {
            date: "2026-02-10".into(),
            total_employees: 12,
            present: 9,
            late: 2,
            on_leave: 1,
            absent: 2,
            attendance_rate: 75,
        };
        let html = render_index("Sen & Rao <Legal>", &summary);
        assert!(html.contains("Sen &amp; Rao &lt;Legal&gt;"));
        assert!(html.contains("Attendance for 2026-02-10"));
        assert!(html.contains(">75%<"));
        assert!(!html.contains("{{"));
    }
}
