//! HTML rendering of the transcript
//!
//! Every string goes through maud's escaping; interactive elements carry
//! `data-command` / `data-option` attributes for the page script.

use crate::state_machine::Coordinates;
use crate::transcript::{ChatMessage, MessageBody};
use maud::{html, Markup};

/// Render the whole transcript as an HTML fragment
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    html! {
        div.messages {
            @for message in messages {
                (render_message(message))
            }
        }
    }
    .into_string()
}

pub fn render_message(message: &ChatMessage) -> Markup {
    html! {
        div class={ "msg " (message.role.as_str()) } data-id=(message.id) {
            (render_body(&message.body))
        }
    }
}

fn render_body(body: &MessageBody) -> Markup {
    match body {
        MessageBody::Text { text } => multiline(text),
        MessageBody::Greeting { prefix, name } => html! {
            (prefix) " " b { (name) } "!"
        },
        MessageBody::Menu { items } => html! {
            div.menu {
                @for item in items {
                    button type="button" data-command=(item.command.as_str()) { (item.label) }
                }
            }
        },
        MessageBody::QuizQuestion {
            number,
            prompt,
            options,
        } => html! {
            b { "Q" (number) ": " } (prompt)
            div.quiz-options {
                @for (i, option) in options.iter().enumerate() {
                    button type="button" data-option=(i) { (option) }
                }
            }
        },
        MessageBody::Pledge { lead, pledge } => html! {
            (lead) br; i { (pledge) }
        },
        MessageBody::Report { text } => html! {
            pre.report { (text) }
        },
        MessageBody::Download {
            export_id,
            filename,
            label,
        } => html! {
            a.download href={ "/api/chat/exports/" (export_id) } download=(filename) { (label) }
        },
        MessageBody::Location {
            label,
            latitude,
            longitude,
            link_label,
        } => {
            let coords = Coordinates {
                latitude: *latitude,
                longitude: *longitude,
            };
            html! {
                (label) " " (format!("{latitude:.4}, {longitude:.4}")) br;
                a href=(coords.maps_url()) target="_blank" rel="noopener" { (link_label) }
            }
        }
    }
}

fn multiline(text: &str) -> Markup {
    html! {
        @for (i, line) in text.lines().enumerate() {
            @if i > 0 { br; }
            (line)
        }
    }
}
