use crate::core::invites::JoinAttribution;

pub fn join_notice(member_mention: &str) -> String {
    format!("📥 **{} joined the server**", member_mention)
}

pub fn invite_notice(member_mention: &str, attribution: &JoinAttribution) -> String {
    let inviter = attribution
        .inviter_id
        .map(|id| format!("<@{}>", id))
        .unwrap_or_else(|| "Unknown".to_string());

    let mut notice = format!(
        "📥 **{} joined**\n👤 Invited by: {}\n🔢 Total invites: **{}**",
        member_mention, inviter, attribution.total_invites
    );

    if let Some(code) = &attribution.invite_code {
        notice.push_str(&format!("\n🔗 Invite: `{}`", code));
    }

    notice
}
