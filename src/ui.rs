use crate::export::{PDF_ENABLE_HINT, PdfCapability};
use crate::models::{Macro, MacroEntry, WeekOption, WeeklySummary};
use crate::stats::{format_stat, week_label};
use chrono::NaiveDate;
use std::fmt::Write;

pub struct Dashboard {
    pub today: MacroEntry,
    pub weeks: Vec<WeekOption>,
    pub selected_week: NaiveDate,
    pub summary: WeeklySummary,
    pub trend_svg: String,
    pub week_svg: String,
    pub pdf: PdfCapability,
}

pub fn render_index(view: &Dashboard) -> String {
    INDEX_HTML
        .replace("{{DATE}}", &view.today.date.format("%A, %b %d, %Y").to_string())
        .replace("{{WEEK}}", &view.selected_week.to_string())
        .replace("{{INPUTS}}", &render_inputs(&view.today))
        .replace("{{TREND_CHART}}", &view.trend_svg)
        .replace("{{WEEK_OPTIONS}}", &render_week_options(&view.weeks, view.selected_week))
        .replace("{{SUMMARY_TABLE}}", &render_summary(&view.summary))
        .replace("{{WEEK_LABEL}}", &week_label(view.selected_week))
        .replace("{{WEEK_CHART}}", &view.week_svg)
        .replace("{{EXPORTS}}", &render_exports(view.selected_week, view.pdf))
}

fn render_inputs(today: &MacroEntry) -> String {
    let mut html = String::new();
    for kind in Macro::ALL {
        let name = kind.label().to_ascii_lowercase();
        let _ = write!(
            html,
            r#"<label class="stat">
          <span class="label">{label} (g)</span>
          <input class="value" type="number" id="{name}" name="{name}" min="0" max="{max}" step="1" value="{value}" required />
        </label>
        "#,
            label = kind.label(),
            max = kind.max_grams(),
            value = today.value(kind),
        );
    }
    html
}

/// Logged weeks, most recent first. A selected week with no rows is slotted in by date.
fn render_week_options(weeks: &[WeekOption], selected: NaiveDate) -> String {
    let mut options = weeks.to_vec();
    if !options.iter().any(|week| week.week_start == selected) {
        let at = options
            .iter()
            .position(|week| week.week_start < selected)
            .unwrap_or(options.len());
        options.insert(
            at,
            WeekOption {
                week_start: selected,
                label: week_label(selected),
            },
        );
    }

    let mut html = String::new();
    for week in &options {
        let marker = if week.week_start == selected { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{}"{marker}>{}</option>"#,
            week.week_start, week.label
        );
    }
    html
}

fn render_summary(summary: &WeeklySummary) -> String {
    let mut html = String::from(
        "<table class=\"summary\"><thead><tr><th>Macro</th><th>Average</th><th>Min</th><th>Max</th><th>Days in Target</th></tr></thead><tbody>",
    );
    for row in &summary.rows {
        let days = row
            .days_in_target
            .map(|days| days.to_string())
            .unwrap_or_else(|| "No data".to_string());
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            row.name.label(),
            format_stat(row.average),
            format_stat(row.min),
            format_stat(row.max),
            days,
        );
    }
    html.push_str("</tbody></table>");
    if !summary.has_data() {
        html.push_str(r#"<p class="hint">No entries were logged for this week.</p>"#);
    }
    html
}

fn render_exports(week: NaiveDate, pdf: PdfCapability) -> String {
    let mut html = format!(
        r#"<a class="btn btn-primary" href="/export/csv?week={week}">Download CSV</a>"#
    );
    if pdf.is_available() {
        let _ = write!(
            html,
            r#"<a class="btn btn-secondary" href="/export/pdf?week={week}">Download PDF</a>"#
        );
    } else {
        let _ = write!(html, r#"<p class="status" data-type="warning">{PDF_ENABLE_HINT}</p>"#);
    }
    html
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Macro Tracker</title>
  <style>
    :root {
      --bg-1: #f3f1ea;
      --bg-2: #d9e4dd;
      --ink: #23272a;
      --accent: #7a4fd1;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg-2), var(--bg-1) 55%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Georgia", serif;
      font-size: clamp(1.9rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .subtitle,
    .hint {
      margin: 0;
      color: #5f5c57;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 16px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.1);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat input {
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent-2);
      border: none;
      border-bottom: 2px solid rgba(47, 72, 88, 0.15);
      background: transparent;
      width: 100%;
    }

    .chart-card {
      background: white;
      border-radius: 18px;
      padding: 12px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      overflow-x: auto;
    }

    .chart-card svg {
      width: 100%;
      height: auto;
    }

    table.summary {
      width: 100%;
      border-collapse: collapse;
      background: white;
    }

    table.summary th {
      background: #d0d0d0;
    }

    table.summary th,
    table.summary td {
      border: 1px solid #23272a;
      padding: 8px;
      text-align: center;
    }

    select {
      font-size: 1rem;
      padding: 6px 10px;
      border-radius: 10px;
    }

    .exports {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: center;
    }

    .btn {
      border-radius: 999px;
      padding: 12px 20px;
      font-weight: 600;
      text-decoration: none;
      color: white;
    }

    .btn-primary {
      background: var(--accent);
    }

    .btn-secondary {
      background: var(--accent-2);
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
      margin: 0;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="warning"] {
      color: #9a6a00;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Daily Macro Tracker</h1>
      <p class="subtitle">Enter your macros for <strong>today</strong> ({{DATE}}). Changes are saved as you go.</p>
    </header>

    <form id="entry-form" class="panel" method="post" action="/today">
      {{INPUTS}}
      <input type="hidden" name="week" value="{{WEEK}}" />
      <noscript><button type="submit">Save</button></noscript>
    </form>
    <div class="status" id="status"></div>

    <section>
      <h2>Macro Trend Over Time</h2>
      <div class="chart-card">{{TREND_CHART}}</div>
    </section>

    <section>
      <h2>Weekly Progress Summary</h2>
      <form method="get" action="/">
        <label for="week">Select a week:</label>
        <select id="week" name="week" onchange="this.form.submit()">{{WEEK_OPTIONS}}</select>
        <noscript><button type="submit">Show</button></noscript>
      </form>
    </section>

    <section>
      <h2>Weekly Macro Summary: {{WEEK_LABEL}}</h2>
      {{SUMMARY_TABLE}}
    </section>

    <section>
      <h2>Macro Trends This Week</h2>
      <div class="chart-card">{{WEEK_CHART}}</div>
    </section>

    <section>
      <h2>Export This Summary</h2>
      <div class="exports">{{EXPORTS}}</div>
    </section>
  </main>

  <script>
    const form = document.getElementById('entry-form');
    const statusEl = document.getElementById('status');
    const fields = ['protein', 'carbs', 'fat'].map((name) => document.getElementById(name));

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const clampField = (input) => {
      const min = Number(input.min);
      const max = Number(input.max);
      const value = Math.round(Number(input.value));
      const clamped = Number.isFinite(value) ? Math.min(Math.max(value, min), max) : min;
      input.value = clamped;
      return clamped;
    };

    const save = async () => {
      const [protein, carbs, fat] = fields.map(clampField);
      setStatus('Saving...', 'info');
      const res = await fetch('/api/today', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ protein, carbs, fat })
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      window.location.reload();
    };

    fields.forEach((input) => {
      input.addEventListener('change', () => {
        save().catch((err) => setStatus(err.message, 'error'));
      });
    });

    form.addEventListener('submit', (event) => {
      event.preventDefault();
      save().catch((err) => setStatus(err.message, 'error'));
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dashboard(pdf: PdfCapability) -> Dashboard {
        let today = MacroEntry {
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            protein: 150,
            carbs: 200,
            fat: 70,
        };
        let week = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        Dashboard {
            today,
            weeks: vec![WeekOption {
                week_start: week,
                label: week_label(week),
            }],
            selected_week: week,
            summary: summarize(&[today], week),
            trend_svg: "<svg id=\"trend\"></svg>".to_string(),
            week_svg: "<svg id=\"week\"></svg>".to_string(),
            pdf,
        }
    }

    #[test]
    fn inputs_are_prefilled_and_bounded() {
        let html = render_index(&dashboard(PdfCapability::Available));

        assert!(html.contains(r#"id="protein" name="protein" min="0" max="300" step="1" value="150""#));
        assert!(html.contains(r#"id="carbs" name="carbs" min="0" max="400" step="1" value="200""#));
        assert!(html.contains(r#"id="fat" name="fat" min="0" max="200" step="1" value="70""#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn selected_week_is_marked_and_summarised() {
        let html = render_index(&dashboard(PdfCapability::Available));

        assert!(html.contains(r#"<option value="2026-03-02" selected>Mar 02, 2026</option>"#));
        assert!(html.contains("<td>Protein</td><td>150</td><td>150</td><td>150</td><td>1</td>"));
        assert!(html.contains("Download PDF"));
    }

    #[test]
    fn unlogged_selected_week_is_offered_in_date_order() {
        let weeks = [date(2026, 3, 16), date(2026, 3, 2)]
            .map(|week_start| WeekOption {
                week_start,
                label: week_label(week_start),
            });

        let html = render_week_options(&weeks, date(2026, 3, 9));

        assert_eq!(html.matches("<option").count(), 3);
        assert_eq!(html.matches(" selected").count(), 1);
        let newer = html.find(r#"value="2026-03-16""#).unwrap();
        let picked = html
            .find(r#"<option value="2026-03-09" selected>Mar 09, 2026</option>"#)
            .unwrap();
        let older = html.find(r#"value="2026-03-02""#).unwrap();
        assert!(newer < picked && picked < older);
    }

    #[test]
    fn unlogged_week_with_empty_log_is_the_only_option() {
        let html = render_week_options(&[], date(2026, 1, 5));

        assert_eq!(html, r#"<option value="2026-01-05" selected>Jan 05, 2026</option>"#);
    }

    #[test]
    fn empty_summary_shows_no_data() {
        let mut view = dashboard(PdfCapability::Unavailable);
        view.summary = summarize(&[], view.selected_week);

        let html = render_index(&view);

        assert!(html.contains("<td>Fat</td><td>No data</td><td>No data</td><td>No data</td><td>No data</td>"));
        assert!(html.contains(PDF_ENABLE_HINT));
        assert!(!html.contains("Download PDF"));
    }
}
