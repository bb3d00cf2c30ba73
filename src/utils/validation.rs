use anyhow::{anyhow, Result};

pub fn validate_prize(prize: &str) -> Result<()> {
    let prize = prize.trim();

    if prize.is_empty() {
        return Err(anyhow!("Prize description cannot be empty"));
    }

    if prize.len() > 200 {
        return Err(anyhow!("Prize description cannot be longer than 200 characters"));
    }

    if prize.contains('\n') || prize.contains('\r') {
        return Err(anyhow!("Prize description cannot contain line breaks"));
    }

    Ok(())
}

pub fn validate_template(template: &str) -> Result<()> {
    let template = template.trim();

    if template.is_empty() {
        return Err(anyhow!("Template cannot be empty"));
    }

    if template.len() < 3 {
        return Err(anyhow!("Template must be at least 3 characters long"));
    }

    if template.len() > 1000 {
        return Err(anyhow!("Template cannot be longer than 1000 characters"));
    }

    Ok(())
}

pub fn validate_winner_template(template: &str) -> Result<()> {
    validate_template(template)?;

    if !template.contains("$winner") {
        return Err(anyhow!("Winner template must contain the $winner placeholder"));
    }

    Ok(())
}

/// Accepts a channel reference as `@name` or bare `name` and returns the
/// normalized `@name` form Telegram expects.
pub fn validate_channel_username(channel: &str) -> Result<String> {
    let name = channel.trim().trim_start_matches('@');

    if name.len() < 5 {
        return Err(anyhow!("Channel username must be at least 5 characters long"));
    }

    if name.len() > 32 {
        return Err(anyhow!("Channel username cannot be longer than 32 characters"));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(anyhow!(
            "Channel username can only contain letters, numbers, and underscores"
        ));
    }

    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(anyhow!("Channel username must start with a letter"));
    }

    Ok(format!("@{name}"))
}

pub fn validate_telegram_chat_id(chat_id: i64) -> Result<()> {
    if chat_id == 0 {
        return Err(anyhow!("Chat ID cannot be zero"));
    }

    // Positive ids are private/user chats; raffles run in groups, supergroups,
    // and channels, which Telegram addresses with negative ids. Supergroup and
    // channel ids start around -1000000000000; anything far beyond that range
    // is not a chat id Telegram hands out.
    if chat_id < -2_000_000_000_000 {
        return Err(anyhow!("Chat ID out of valid range"));
    }

    Ok(())
}
