use crate::models::{LeaderboardEntry, TodayResponse};
use std::fmt::Write;

pub const QUICK_AMOUNTS: [u64; 3] = [10, 50, 100];

pub fn render_index(today: &TodayResponse, leaderboard: &[LeaderboardEntry], user_name: &str) -> String {
    INDEX_HTML
        .replace("{{USER}}", &escape(user_name))
        .replace("{{DATE}}", &today.date)
        .replace("{{TOTAL}}", &today.total_amount.to_string())
        .replace("{{COUNT}}", &today.tip_count.to_string())
        .replace("{{QUICK}}", &quick_buttons())
        .replace("{{TIPS}}", &tip_rows(today))
        .replace("{{LEADERBOARD}}", &leaderboard_rows(leaderboard))
}

fn quick_buttons() -> String {
    let mut html = String::new();
    for amount in QUICK_AMOUNTS {
        let _ = write!(
            html,
            r#"<form method="post" action="/tip/{amount}"><button class="btn-add" type="submit">+{amount}</button></form>"#
        );
    }
    html
}

fn tip_rows(today: &TodayResponse) -> String {
    if today.tips.is_empty() {
        return r#"<li class="empty">No tips yet today</li>"#.to_string();
    }
    let mut html = String::new();
    for tip in &today.tips {
        let _ = write!(
            html,
            r#"<li><span class="time">{}</span><span class="amount">{}</span><button class="remove" data-id="{}">&times;</button></li>"#,
            escape(&tip.time),
            tip.amount,
            escape(&tip.id),
        );
    }
    html
}

fn leaderboard_rows(leaderboard: &[LeaderboardEntry]) -> String {
    if leaderboard.is_empty() {
        return r#"<li class="empty">Nobody on the board yet</li>"#.to_string();
    }
    let mut html = String::new();
    for (rank, entry) in leaderboard.iter().enumerate() {
        let _ = write!(
            html,
            r#"<li><span class="rank">{}</span><span class="name">{}</span><span class="amount">{} ({} tips)</span></li>"#,
            rank + 1,
            escape(&entry.contributor_name),
            entry.total_amount,
            entry.tip_count,
        );
    }
    html
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
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
  <title>Tip Tracker</title>
  <style>
    :root {
      --bg: #f3f7f5;
      --ink: #1f2a27;
      --accent: #10b981;
      --accent-dark: #047857;
      --card: #ffffff;
      --muted: #6b7a75;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px 16px 48px;
    }

    .app {
      width: min(640px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      padding: 20px;
      box-shadow: 0 12px 32px rgba(4, 120, 87, 0.08);
    }

    .total {
      background: linear-gradient(90deg, var(--accent), var(--accent-dark));
      color: white;
      text-align: center;
    }

    .total .value {
      font-size: 2.4rem;
      font-weight: 700;
    }

    .quick {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 12px;
    }

    .quick form {
      margin: 0;
    }

    button {
      border: none;
      border-radius: 12px;
      padding: 14px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
    }

    .btn-add {
      width: 100%;
      background: var(--accent);
      color: white;
    }

    ul {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 8px;
    }

    li {
      display: flex;
      gap: 12px;
      align-items: center;
    }

    li .amount {
      margin-left: auto;
      font-weight: 600;
    }

    li.empty {
      color: var(--muted);
    }

    .remove {
      background: transparent;
      color: var(--muted);
      padding: 4px 8px;
    }

    #stats dd {
      margin: 0 0 8px;
      font-weight: 600;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Tip Tracker</h1>
      <p>Hello, {{USER}}!</p>
    </header>

    <section class="card total">
      <div>Earned today ({{DATE}})</div>
      <div class="value">{{TOTAL}}</div>
      <div>{{COUNT}} tips</div>
    </section>

    <section class="quick">{{QUICK}}</section>

    <section class="card">
      <h2>Today</h2>
      <ul id="tips">{{TIPS}}</ul>
    </section>

    <section class="card">
      <h2>Leaderboard</h2>
      <ul>{{LEADERBOARD}}</ul>
    </section>

    <section class="card">
      <h2>Stats</h2>
      <dl id="stats"></dl>
    </section>
  </main>

  <script>
    document.getElementById('tips').addEventListener('click', async (event) => {
      const id = event.target.dataset.id;
      if (!id) {
        return;
      }
      await fetch(`/api/tips/${encodeURIComponent(id)}`, { method: 'DELETE' });
      window.location.reload();
    });

    const loadStats = async () => {
      const response = await fetch('/api/stats?range=week');
      if (!response.ok) {
        return;
      }
      const stats = await response.json();
      const rows = [
        ['Average tip', stats.averageTip],
        ['Last 7 days', stats.weekAmount],
        ['Last month', stats.monthAmount],
        ['Best day', stats.bestDay ? `${stats.bestDay.date}: ${stats.bestDay.totalAmount}` : '--'],
        ['Small / medium / large', `${stats.categories.small} / ${stats.categories.medium} / ${stats.categories.large}`],
      ];
      const list = document.getElementById('stats');
      list.replaceChildren();
      for (const [label, value] of rows) {
        const dt = document.createElement('dt');
        dt.textContent = label;
        const dd = document.createElement('dd');
        dd.textContent = value;
        list.append(dt, dd);
      }
    };

    loadStats();
  </script>
</body>
</html>
"#;
