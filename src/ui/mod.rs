mod admin;
mod landing;

pub use admin::{render_admin, render_admin_error, AdminTab, AdminView};
pub use landing::{render_landing, LandingView, Notice};

/// Escapes text for element bodies and quoted attribute values.
pub fn escape(value: &str) -> String {
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

/// Substitutes `{{KEY}}` markers in one pass; inserted values are never rescanned.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

pub fn format_duration(seconds: f64) -> String {
    let total = seconds.round() as u64;
    if total < 60 {
        format!("{total}s")
    } else {
        format!("{}m {:02}s", total / 60, total % 60)
    }
}

const BASE_CSS: &str = r#"
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f6f4ee;
      --bg-2: #cfe3dc;
      --ink: #1f2a2e;
      --muted: #5d6a6e;
      --accent: #1f8a70;
      --accent-2: #233d4d;
      --warn: #c63b2b;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(35, 61, 77, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 55%),
        linear-gradient(160deg, var(--bg-1), #eef5f1 60%, #f9f8f4 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    h1, h2, h3 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      margin: 0;
    }

    a {
      color: var(--accent-2);
    }

    .wrap {
      width: min(1080px, 100%);
      margin: 0 auto;
      padding: 0 20px;
    }

    .card {
      background: var(--card);
      border-radius: 22px;
      box-shadow: var(--shadow);
      padding: 28px;
    }

    .btn {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 22px;
      font: inherit;
      font-weight: 600;
      cursor: pointer;
      text-decoration: none;
      display: inline-flex;
      align-items: center;
      justify-content: center;
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(31, 138, 112, 0.28);
    }

    .btn.secondary {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 18px rgba(35, 61, 77, 0.12);
    }

    .btn.small {
      padding: 8px 14px;
      font-size: 0.85rem;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: var(--muted);
    }

    input, select, textarea {
      font: inherit;
      padding: 11px 14px;
      border-radius: 12px;
      border: 1px solid rgba(35, 61, 77, 0.18);
      background: white;
      color: var(--ink);
    }

    .field-error {
      color: var(--warn);
      font-size: 0.85rem;
    }

    .notice {
      border-radius: 14px;
      padding: 14px 18px;
      font-weight: 500;
    }

    .notice.ok {
      background: #e1f3ec;
      color: #1c6b55;
    }

    .notice.error {
      background: #fbe4e1;
      color: var(--warn);
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.92rem;
    }

    th, td {
      text-align: left;
      padding: 10px 8px;
      border-bottom: 1px solid rgba(35, 61, 77, 0.08);
      vertical-align: top;
    }

    th {
      font-size: 0.78rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }
"#;

/// Wraps a body in the shared document shell.
pub fn page(title: &str, extra_css: &str, body: &str) -> String {
    let title = escape(title);
    fill(
        PAGE_HTML,
        &[
            ("TITLE", title.as_str()),
            ("BASE_CSS", BASE_CSS),
            ("EXTRA_CSS", extra_css),
            ("BODY", body),
        ],
    )
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>{{BASE_CSS}}{{EXTRA_CSS}}</style>
</head>
<body>
{{BODY}}
</body>
</html>
"#;
