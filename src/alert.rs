//! Renders flash notices as dismissible alert boxes.

use maud::{Markup, html};

use crate::flash::{Flash, FlashLevel};

fn alert_style(level: FlashLevel) -> &'static str {
    match level {
        FlashLevel::Success => {
            "p-4 mb-4 text-sm text-green-800 rounded-lg bg-green-50 \
            dark:bg-gray-800 dark:text-green-400"
        }
        FlashLevel::Info => {
            "p-4 mb-4 text-sm text-blue-800 rounded-lg bg-blue-50 \
            dark:bg-gray-800 dark:text-blue-400"
        }
        FlashLevel::Warning => {
            "p-4 mb-4 text-sm text-yellow-800 rounded-lg bg-yellow-50 \
            dark:bg-gray-800 dark:text-yellow-300"
        }
        FlashLevel::Danger => {
            "p-4 mb-4 text-sm text-red-800 rounded-lg bg-red-50 \
            dark:bg-gray-800 dark:text-red-400"
        }
    }
}

/// An alert box for `flash`.
pub fn alert(flash: &Flash) -> Markup {
    // Template adapted from https://flowbite.com/docs/components/alerts/
    html! {
        div class=(alert_style(flash.level)) role="alert"
        {
            span class="font-medium" { (flash.message) }
        }
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use crate::flash::{Flash, FlashLevel};

    use super::alert;

    #[test]
    fn renders_message_with_alert_role() {
        let markup = alert(&Flash::new(FlashLevel::Warning, "Please log in first."));
        let html = Html::parse_fragment(&markup.into_string());

        let alert = html
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("No alert found");

        assert_eq!(alert.text().collect::<String>().trim(), "Please log in first.");
        assert!(alert.value().attr("class").unwrap().contains("yellow"));
    }
}
