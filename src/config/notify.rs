//! Discord webhook configuration constants and types.

/// Hard platform limits enforced before a payload leaves the process
pub struct DiscordLimits {
    pub embeds_per_message: usize,
    pub fields_per_embed: usize,
    pub field_name_chars: usize,
    pub field_value_chars: usize,
    pub description_chars: usize,
    pub footer_chars: usize,
}

/// Embed accent colors (hex RGB)
pub struct DiscordColors {
    pub spreads: u32,
    pub triangular: u32,
    pub persistent: u32,
    pub trending: u32,
    pub summary: u32,
}

/// The Master Discord Configuration Struct
pub struct DiscordConfig {
    // Environment variable holding the webhook URL; absent means notifications off
    pub webhook_url_env: &'static str,
    pub footer: &'static str,
    pub limits: DiscordLimits,
    pub colors: DiscordColors,
}

pub const DISCORD: DiscordConfig = DiscordConfig {
    webhook_url_env: "DISCORD_WEBHOOK_URL",
    footer: "orbscreen",

    limits: DiscordLimits {
        embeds_per_message: 10,
        fields_per_embed: 25,
        field_name_chars: 256,
        field_value_chars: 1024,
        description_chars: 4096,
        footer_chars: 2048,
    },

    colors: DiscordColors {
        spreads: 0x2ecc71,
        triangular: 0xe74c3c,
        persistent: 0x9b59b6,
        trending: 0xf39c12,
        summary: 0x3498db,
    },
};
