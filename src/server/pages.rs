//! HTML rendering for the browser views.
//!
//! Pages are small enough to build inline; every user-controlled string goes
//! through [`escape`].

use crate::flow::View;
use crate::model::FEATURE_COLUMNS;
use crate::session::Flash;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:32rem;margin:2rem auto}\
label{display:block;margin-top:.5rem}\
.flash{padding:.5rem;border-radius:4px;margin:.5rem 0}\
.success{background:#e6f4ea}.error{background:#fce8e6}\
.prediction{font-size:1.25rem;font-weight:bold}";

/// Escape text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render a view with the flashes pending on the session.
pub fn render(view: &View, flashes: &[Flash]) -> String {
    let (title, body) = match view {
        View::Login => ("Login", login_body()),
        View::Register => ("Register", register_body()),
        View::UserHome {
            username,
            prediction,
        } => ("Crop Recommendation", home_body(username, prediction.as_deref(), false)),
        View::AdminHome {
            username,
            prediction,
        } => ("Admin Dashboard", home_body(username, prediction.as_deref(), true)),
    };

    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title>\
         <style>{STYLE}</style></head>\n<body>\n<h1>{title}</h1>\n{flashes}{body}</body>\n</html>\n",
        flashes = flash_list(flashes),
    )
}

fn flash_list(flashes: &[Flash]) -> String {
    flashes
        .iter()
        .map(|f| {
            format!(
                "<div class=\"flash {}\">{}</div>\n",
                f.kind.as_str(),
                escape(&f.message)
            )
        })
        .collect()
}

fn field(label: &str, name: &str, kind: &str) -> String {
    format!(
        "<label>{label} <input type=\"{kind}\" name=\"{name}\" required></label>\n"
    )
}

fn login_body() -> String {
    format!(
        "<form method=\"post\" action=\"/login\">\n{}{}<button type=\"submit\">Login</button>\n</form>\n\
         <p>No account? <a href=\"/register\">Register</a></p>\n",
        field("Username", "username", "text"),
        field("Password", "password", "password"),
    )
}

fn register_body() -> String {
    format!(
        "<form method=\"post\" action=\"/register\">\n{}{}{}<button type=\"submit\">Register</button>\n</form>\n\
         <p>Already registered? <a href=\"/login\">Login</a></p>\n",
        field("Username", "username", "text"),
        field("Password", "password", "password"),
        field("Confirm Password", "confirm_password", "password"),
    )
}

fn home_body(username: &str, prediction: Option<&str>, is_admin: bool) -> String {
    let mut body = format!("<p>Signed in as {}", escape(username));
    if is_admin {
        body.push_str(" (administrator)");
    }
    body.push_str(". <a href=\"/logout\">Logout</a></p>\n");

    body.push_str("<form method=\"post\" action=\"/predict\">\n");
    for name in FEATURE_COLUMNS {
        body.push_str(&field(name, name, "text"));
    }
    body.push_str("<button type=\"submit\">Recommend</button>\n</form>\n");

    if let Some(label) = prediction {
        body.push_str(&format!(
            "<p class=\"prediction\">Recommended crop: {}</p>\n",
            escape(label)
        ));
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FlashKind;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
    }

    #[test]
    fn home_shows_prediction_and_flashes() {
        let page = render(
            &View::UserHome {
                username: "<alice>".into(),
                prediction: Some("rice".into()),
            },
            &[Flash {
                kind: FlashKind::Success,
                message: "Login successful!".into(),
            }],
        );
        assert!(page.contains("Recommended crop: rice"));
        assert!(page.contains("&lt;alice&gt;"));
        assert!(page.contains("class=\"flash success\">Login successful!"));
        assert!(page.contains("name=\"rainfall\""));
        assert!(!page.contains("administrator"));
    }

    #[test]
    fn admin_home_is_marked() {
        let page = render(
            &View::AdminHome {
                username: "admin".into(),
                prediction: None,
            },
            &[],
        );
        assert!(page.contains("Admin Dashboard"));
        assert!(page.contains("(administrator)"));
    }
}
