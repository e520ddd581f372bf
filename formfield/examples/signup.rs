//! A signup form driven from a script of user events.
//!
//! Run with `cargo run --example signup`; debug logs go to `signup.log`.

use std::fs::File;
use std::time::Duration;

use formfield::prelude::*;
use simplelog::{Config, LevelFilter, WriteLogger};

/// Pretend server round trip for a taken username.
fn username_available() -> Validator<String> {
    Validator::deferred(|name: &String| {
        let name = name.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            matches!(name.as_str(), "admin" | "root").then(|| format!("'{name}' is taken"))
        }
    })
    .named("username_available")
}

fn show(label: &str, classes: InputClasses, error: Option<String>) {
    println!(
        "  {label:<9} [{}] {}",
        classes.class_list().join(" "),
        error.unwrap_or_default()
    );
}

async fn pause(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::main]
async fn main() {
    if let Ok(log_file) = File::create("signup.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);
    }

    let email = InputLayout::email(InputAttributes::<String>::new("Email").name("email"));

    let username = InputLayout::new(InputAttributes::<String>::new("Username").name("username"));
    username.field().set_validators([
        rules::required("Username is required"),
        rules::min_length(3, "At least 3 characters"),
        username_available(),
    ]);

    let country = SelectInputLayout::new().with_label("Country").with_items([
        SelectInputValue::new("nl", "Netherlands"),
        SelectInputValue::new("be", "Belgium"),
        SelectInputValue::new("xx", "Atlantis").disabled(),
    ]);

    println!("typing an email (validation waits for blur)");
    email.focus();
    for partial in ["a", "ad", "ada", "ada@", "ada@example"] {
        email.field().set_value(partial.to_string());
        pause(40).await;
    }
    show("email", email.css_classes(), email.error_text());

    println!("leaving the email input");
    email.blur();
    pause(150).await;
    show("email", email.css_classes(), email.error_text());

    println!("fixing the email");
    email.focus();
    email.field().set_value("ada@example.com".to_string());
    pause(150).await;
    email.blur();
    show("email", email.css_classes(), email.error_text());

    println!("typing a username; the slow check for 'admin' loses to 'adm1n'");
    username.focus();
    username.field().set_value("admin".to_string());
    pause(150).await;
    println!("  validating: {}", username.field().is_validating());
    username.field().set_value("adm1n".to_string());
    pause(600).await;
    show("username", username.css_classes(), username.error_text());
    println!("  requests started: {}", username.field().request_count());

    println!("picking a country");
    country.toggle_dropdown();
    if !country.select_value(2) {
        println!("  Atlantis is disabled");
    }
    country.select_value(0);
    println!(
        "  selected {:?}, dropdown open: {}",
        country.selected().and_then(|item| item.label),
        country.has_focus()
    );

    let ready = email.field().has_success() && username.field().has_success();
    println!("form ready: {ready}");

    email.dispose();
    username.dispose();
    country.dispose();
}
