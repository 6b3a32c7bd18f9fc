use crate::backend::ConversationRecord;
use crate::chat::NewMessage;

/// Turns stored exchanges (newest first) into chronological messages.
///
/// Each exchange becomes its reply (when present) followed by the prompt that
/// produced it; reversing the flattened list then puts the oldest prompt first
/// with its reply right after it.
pub fn flatten_history(records: Vec<ConversationRecord>) -> Vec<NewMessage> {
    let mut messages = Vec::with_capacity(records.len() * 2);
    for record in records {
        if let Some(reply) = record.response {
            let canvas = reply.canvas();
            messages.push(NewMessage::assistant(reply.text).with_canvas(canvas).historical());
        }
        messages.push(NewMessage::user(record.message).historical());
    }
    messages.reverse();
    messages
}

#[cfg(test)]
mod tests {
    use super::flatten_history;
    use crate::backend::decode_history;
    use crate::canvas::payload::CanvasKind;
    use crate::chat::Origin;

    #[test]
    fn single_exchange_is_prompt_then_reply() {
        let records = decode_history(
            r#"{"status":"success","conversations":[{"message":"hi","response":{"text":"hello","canvasType":"none"}}]}"#,
        )
        .expect("history should decode");

        let messages = flatten_history(records);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].origin, Origin::User);
        assert_eq!(messages[0].text, "hi");
        assert_eq!(messages[1].origin, Origin::Assistant);
        assert_eq!(messages[1].text, "hello");
        assert_eq!(messages[1].canvas.kind, CanvasKind::None);
        assert!(messages.iter().all(|message| message.is_historical));
    }

    #[test]
    fn newest_first_records_come_out_oldest_first() {
        let records = decode_history(
            r#"{"status":"success","conversations":[
                {"message":"second","response":{"text":"second reply","canvasType":"roadmap","canvasUtils":{"roadmap":[]}}},
                {"message":"first","response":{"text":"first reply"}}
            ]}"#,
        )
        .expect("history should decode");

        let texts: Vec<String> = flatten_history(records)
            .into_iter()
            .map(|message| message.text)
            .collect();

        assert_eq!(texts, vec!["first", "first reply", "second", "second reply"]);
    }

    #[test]
    fn unanswered_prompt_has_no_reply() {
        let records = decode_history(r#"{"status":"success","conversations":[{"message":"anyone?"}]}"#)
            .expect("history should decode");

        let messages = flatten_history(records);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].origin, Origin::User);
    }
}
