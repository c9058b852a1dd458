// --- File: crates/coffeechat_reply/src/prompts.rs ---
//! Prompts sent to the text generator and the templates used when it is unavailable.

pub fn reply_prompt(original_email: &str, sender_name: &str, slots_text: &str, signature: &str) -> String {
    format!(
        r#"Write a friendly, natural email reply to schedule a meeting.

ORIGINAL EMAIL FROM {sender_name}:
{original_email}

MY AVAILABLE TIME SLOTS:
{slots_text}

INSTRUCTIONS:
- Start with "Hi {sender_name},"
- Be warm and human and match the tone of their email
- If they apologized or mentioned an inconvenience, acknowledge it naturally
- If they sound excited, mirror that energy; for recruiting emails be professionally enthusiastic
- Keep it to 2-3 short paragraphs
- Include the time slots as a bulleted list
- End with something like "Let me know what works!" and sign off as "{signature}"
- Write like a real person, not a formal template

Return ONLY the email text, no explanation."#
    )
}

pub fn compose_prompt(recipient_name: &str, context: &str, slots_text: &str, signature: &str) -> String {
    format!(
        r#"Write a friendly, natural email to request a meeting.

RECIPIENT: {recipient_name}
PURPOSE/CONTEXT: {context}

MY AVAILABLE TIME SLOTS:
{slots_text}

INSTRUCTIONS:
- Start with "Hi {recipient_name},"
- Be warm and natural, not corporate
- Briefly explain why you want to meet, based on the context
- Include the time slots as a bulleted list
- Ask them to say what works or suggest alternatives
- Keep it to 2-3 short paragraphs
- Sign off as "{signature}"

Return ONLY the email text, no explanation."#
    )
}

pub fn refine_prompt(current_reply: &str, feedback: &str) -> String {
    format!(
        r#"Here is an email reply I'm drafting:

{current_reply}

Please modify this email based on the following feedback:
{feedback}

Return ONLY the modified email text, nothing else. Keep the same general structure and time slots unless the feedback specifically asks to change them."#
    )
}

pub fn fallback_reply(sender_name: &str, slots_text: &str, signature: &str) -> String {
    format!(
        "Hi {sender_name},\n\n\
         Thanks for reaching out! I'd be happy to chat.\n\n\
         Here are some times that work for me:\n\n\
         {slots_text}\n\n\
         Let me know what works best for you!\n\n\
         Best,\n\
         {signature}"
    )
}

pub fn fallback_compose(recipient_name: &str, context: &str, slots_text: &str, signature: &str) -> String {
    let opening = if context.trim().is_empty() {
        "I hope you're doing well!".to_string()
    } else {
        format!("I hope you're doing well! {}", context.trim())
    };
    format!(
        "Hi {recipient_name},\n\n\
         {opening}\n\n\
         I'd love to find a time to chat. Here are some slots that work for me:\n\n\
         {slots_text}\n\n\
         Let me know what works for you, or feel free to suggest another time!\n\n\
         Best,\n\
         {signature}"
    )
}
