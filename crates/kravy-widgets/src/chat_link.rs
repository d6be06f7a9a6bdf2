//! Floating "chat with us" link.

/// Accessible label of the link.
pub const CHAT_LABEL: &str = "Chat on WhatsApp";

/// A WhatsApp deep link with a pre-filled message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLink {
    phone_number: String,
    message: String,
}

/// Rendered anchor attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkView {
    pub href: String,
    pub target: &'static str,
    pub rel: &'static str,
    pub aria_label: &'static str,
}

impl ChatLink {
    /// `phone_number` is the full international number; anything but digits
    /// (spaces, `+`) is dropped since the link format takes digits only.
    #[must_use]
    pub fn new(phone_number: &str, message: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.chars().filter(char::is_ascii_digit).collect(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn href(&self) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.phone_number,
            urlencoding::encode(&self.message)
        )
    }

    /// Anchor opening the chat in a new tab.
    #[must_use]
    pub fn render(&self) -> LinkView {
        LinkView {
            href: self.href(),
            target: "_blank",
            rel: "noopener noreferrer",
            aria_label: CHAT_LABEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_encodes_message() {
        let link = ChatLink::new(
            "919289507882",
            "Hi Kravy team, I want to know more about the billing software.",
        );
        assert_eq!(
            link.href(),
            "https://wa.me/919289507882?text=Hi%20Kravy%20team%2C%20I%20want%20to%20know%20more%20about%20the%20billing%20software."
        );
    }

    #[test]
    fn number_keeps_digits_only() {
        let link = ChatLink::new("+91 92895 07882", "hi");
        assert_eq!(link.href(), "https://wa.me/919289507882?text=hi");
    }

    #[test]
    fn renders_external_anchor() {
        let view = ChatLink::new("1", "a&b").render();
        assert_eq!(view.href, "https://wa.me/1?text=a%26b");
        assert_eq!(view.target, "_blank");
        assert_eq!(view.rel, "noopener noreferrer");
        assert_eq!(view.aria_label, CHAT_LABEL);
    }
}
