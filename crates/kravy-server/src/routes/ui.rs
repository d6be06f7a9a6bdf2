//! Landing page route.
//!
//! Server-side render of `/`. The theme toggle is rendered before any
//! client mount, so it always comes out as its neutral placeholder.
//!
//! The lead-capture popup is inert markup: a hidden container with a form
//! that has no `action` and no script attached. Its timing, policy and
//! endpoint travel as data attributes; whatever drives the popup (the
//! `kravy_widgets::dialog::LeadDialog` state machine) reads them and posts
//! JSON itself. Submitting the bare form does nothing.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;

use kravy_widgets::chat_link::LinkView;
use kravy_widgets::dialog::POPUP_SOURCE;
use kravy_widgets::submitter::ENQUIRY_PATH;
use kravy_widgets::theme::{
    MemoryThemePreference, TOGGLE_LABEL, ThemeControl, ThemeIcon, ThemeToggle,
};

use crate::state::AppState;

/// Build the UI router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(landing_page))
}

async fn landing_page(State(state): State<Arc<AppState>>) -> Html<String> {
    // No stored preference is visible to the server.
    let toggle = ThemeToggle::new(Arc::new(MemoryThemePreference::default()));

    let mut html = String::with_capacity(4096);
    html.push_str(LANDING_HEAD);
    html.push_str("<body>\n<header class=\"nav\"><span class=\"logo\">Kravy</span>");
    html.push_str(&theme_button(toggle.render()));
    html.push_str("</header>\n");
    html.push_str(LANDING_HERO);

    let landing = &state.landing;
    let _ = write!(
        html,
        "<div id=\"enquiry-popup\" hidden data-endpoint=\"{ENQUIRY_PATH}\" data-source=\"{POPUP_SOURCE}\" \
         data-open-delay-ms=\"{}\" data-close-delay-ms=\"{}\" data-policy=\"{}\">\n",
        landing.popup_open_delay.as_millis(),
        landing.popup_close_delay.as_millis(),
        landing.popup_policy,
    );
    html.push_str(POPUP_FORM);
    html.push_str("</div>\n");

    html.push_str(&chat_bubble(&state.chat_link.render()));
    html.push_str("</body></html>\n");
    Html(html)
}

fn theme_button(control: ThemeControl) -> String {
    match control {
        ThemeControl::Placeholder => format!(
            "<button class=\"theme-toggle\" aria-label=\"{TOGGLE_LABEL}\">\
             <span class=\"icon moon\" style=\"opacity:0\"></span></button>"
        ),
        ThemeControl::Toggle { icon, .. } => {
            let icon = match icon {
                ThemeIcon::Moon => "moon",
                ThemeIcon::Sun => "sun",
            };
            format!(
                "<button class=\"theme-toggle\" aria-label=\"{TOGGLE_LABEL}\">\
                 <span class=\"icon {icon}\"></span></button>"
            )
        }
    }
}

fn chat_bubble(link: &LinkView) -> String {
    format!(
        "<a class=\"chat-bubble\" href=\"{}\" target=\"{}\" rel=\"{}\" aria-label=\"{}\"></a>\n",
        link.href, link.target, link.rel, link.aria_label
    )
}

const LANDING_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>Kravy &mdash; Billing software for your shop</title>
<style>
body{font-family:system-ui,sans-serif;margin:0}
.nav{display:flex;justify-content:space-between;align-items:center;padding:16px 24px}
.theme-toggle{padding:8px;border-radius:9999px;border:1px solid #ddd;background:none}
.chat-bubble{position:fixed;bottom:24px;right:24px;width:64px;height:64px;border-radius:50%;background:#25D366}
</style></head>
"#;

const LANDING_HERO: &str = r#"<main class="hero">
<h1>Billing made simple for every shop</h1>
<p>Fast GST billing, inventory, and reports in one place.</p>
</main>
"#;

const POPUP_FORM: &str = r#"<h2>Want Kravy for your shop?</h2>
<p>Share your details and our team will call you with pricing, demo and the best plan for your business.</p>
<form>
<label>Name (optional)<input type="text" name="name" placeholder="Your name"/></label>
<label>Mobile Number<span>+91</span><input type="tel" name="phone" placeholder="10-digit mobile number"/></label>
<p class="status"></p>
<button type="submit">Get Callback</button>
</form>
"#;
