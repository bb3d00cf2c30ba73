use raffle_bot::utils::validation::{
    validate_channel_username, validate_prize, validate_telegram_chat_id, validate_template,
    validate_winner_template,
};

mod prize_validation {
    use super::*;

    #[test]
    fn accepts_a_normal_prize() {
        assert!(validate_prize("A box of dice").is_ok());
    }

    #[test]
    fn rejects_empty_prize() {
        assert!(validate_prize("").is_err());
        assert!(validate_prize("   ").is_err());
    }

    #[test]
    fn rejects_overlong_prize() {
        let long_prize = "x".repeat(201);
        assert!(validate_prize(&long_prize).is_err());
        assert!(validate_prize(&"x".repeat(200)).is_ok());
    }

    #[test]
    fn rejects_line_breaks() {
        assert!(validate_prize("line one\nline two").is_err());
        assert!(validate_prize("line one\rline two").is_err());
    }
}

mod template_validation {
    use super::*;

    #[test]
    fn accepts_a_normal_template() {
        assert!(validate_template("Join the raffle below!").is_ok());
    }

    #[test]
    fn rejects_empty_and_too_short_templates() {
        assert!(validate_template("").is_err());
        assert!(validate_template("ab").is_err());
        assert!(validate_template("abc").is_ok());
    }

    #[test]
    fn rejects_overlong_templates() {
        assert!(validate_template(&"x".repeat(1001)).is_err());
        assert!(validate_template(&"x".repeat(1000)).is_ok());
    }

    #[test]
    fn winner_template_requires_the_placeholder() {
        assert!(validate_winner_template("Congrats $winner!").is_ok());
        assert!(validate_winner_template("Congrats, somebody!").is_err());
    }
}

mod channel_validation {
    use super::*;

    #[test]
    fn normalizes_bare_and_prefixed_usernames() {
        assert_eq!(validate_channel_username("@mychannel").unwrap(), "@mychannel");
        assert_eq!(validate_channel_username("mychannel").unwrap(), "@mychannel");
        assert_eq!(validate_channel_username("  @my_channel  ").unwrap(), "@my_channel");
    }

    #[test]
    fn rejects_short_and_long_usernames() {
        assert!(validate_channel_username("@abcd").is_err());
        assert!(validate_channel_username("@abcde").is_ok());
        assert!(validate_channel_username(&format!("@{}", "a".repeat(33))).is_err());
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(validate_channel_username("@my channel").is_err());
        assert!(validate_channel_username("@my-channel").is_err());
        assert!(validate_channel_username("@канал").is_err());
    }

    #[test]
    fn rejects_usernames_starting_with_a_digit() {
        assert!(validate_channel_username("@1channel").is_err());
    }
}

mod chat_id_validation {
    use super::*;

    #[test]
    fn accepts_group_and_supergroup_ids() {
        assert!(validate_telegram_chat_id(-12345).is_ok());
        assert!(validate_telegram_chat_id(-1001234567890).is_ok());
    }

    #[test]
    fn accepts_private_chat_ids() {
        assert!(validate_telegram_chat_id(12345).is_ok());
    }

    #[test]
    fn rejects_zero_and_out_of_range_ids() {
        assert!(validate_telegram_chat_id(0).is_err());
        assert!(validate_telegram_chat_id(-3_000_000_000_000).is_err());
    }
}
