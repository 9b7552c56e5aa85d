//! Discord webhook client and embed builders for the ranked market lists.

use reqwest::Client;
use serde::Serialize;

use crate::analysis::{PersistentMarketEntry, SpreadEntry, TrendingMarketEntry, TriangularCandidate};
use crate::config::{ANALYSIS, DISCORD, PRINT_DISCORD_PAYLOADS};

#[derive(Serialize, Debug)]
struct EmbedField {
    name: String,
    value: String,
    inline: bool,
}

#[derive(Serialize, Debug)]
struct EmbedFooter {
    text: String,
}

#[derive(Serialize, Debug)]
pub struct Embed {
    title: String,
    color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<EmbedField>,
    footer: EmbedFooter,
}

#[derive(Serialize, Debug)]
struct WebhookPayload {
    embeds: Vec<Embed>,
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// More decimals the smaller the price, so chaos-per-mirror and
/// mirror-per-chaos are both readable.
fn fmt_price(price: f64) -> String {
    if price < 0.001 {
        format!("{:.8}", price)
    } else if price < 1.0 {
        format!("{:.4}", price)
    } else {
        format!("{:.2}", price)
    }
}

fn build_embed(title: &str, description: String, fields: Vec<(String, String)>, color: u32) -> Embed {
    Embed {
        title: title.to_string(),
        color,
        description: Some(truncate_chars(&description, DISCORD.limits.description_chars)),
        fields: fields
            .into_iter()
            .take(DISCORD.limits.fields_per_embed)
            .map(|(name, value)| EmbedField {
                name: truncate_chars(&name, DISCORD.limits.field_name_chars),
                value: truncate_chars(&value, DISCORD.limits.field_value_chars),
                inline: false,
            })
            .collect(),
        footer: EmbedFooter {
            text: truncate_chars(DISCORD.footer, DISCORD.limits.footer_chars),
        },
    }
}

pub struct DiscordNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl DiscordNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            webhook_url,
            client: Client::new(),
        }
    }

    pub fn from_env() -> Self {
        let webhook_url = std::env::var(DISCORD.webhook_url_env).ok();
        if webhook_url.is_none() {
            log::info!(
                "{} not set; Discord notifications disabled",
                DISCORD.webhook_url_env
            );
        }
        Self::new(webhook_url)
    }

    pub fn enabled(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Fire-and-forget: all delivery failures end up as warnings.
    async fn send(&self, embeds: Vec<Embed>) {
        let Some(url) = &self.webhook_url else {
            return;
        };
        if embeds.is_empty() {
            return;
        }

        let mut payload = WebhookPayload { embeds };
        payload.embeds.truncate(DISCORD.limits.embeds_per_message);

        if PRINT_DISCORD_PAYLOADS
            && let Ok(json) = serde_json::to_string_pretty(&payload)
        {
            log::info!("webhook payload:\n{}", json);
        }

        match self.client.post(url).json(&payload).send().await {
            Ok(resp) if !resp.status().is_success() => {
                log::warn!("Discord webhook returned {}", resp.status());
            }
            Ok(_) => {}
            Err(e) => log::warn!("Failed to send Discord notification: {:#}", e),
        }
    }

    pub async fn send_spread_opportunities(
        &self,
        entries: &[SpreadEntry],
        league: &str,
        base_currency: &str,
    ) {
        if !self.enabled() || entries.is_empty() {
            return;
        }

        let fields = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let mut volume_parts = Vec::new();
                if entry.base_volume > 0.0 {
                    volume_parts.push(format!("{:.0} {}", entry.base_volume, base_currency));
                }
                if entry.secondary_volume > 0.0 {
                    volume_parts.push(format!(
                        "{:.0} {}",
                        entry.secondary_volume,
                        ANALYSIS.secondary_currency
                    ));
                }
                let volume_text = if volume_parts.is_empty() {
                    "No volume data".to_string()
                } else {
                    volume_parts.join(" | ")
                };

                let value = format!(
                    "```\nSpread:    {:.2}%\nPrice:     {} -> {}\nLiquidity: {:.0}th percentile\nVolume:    {}\n```",
                    entry.spread_pct,
                    fmt_price(entry.min_price),
                    fmt_price(entry.max_price),
                    entry.liquidity_percentile,
                    volume_text
                );
                (format!("#{} {}", i + 1, entry.pair), value)
            })
            .collect();

        let description = format!(
            "**League:** {}\n**Base Currency:** {}\n\nMarkets with highest historical volatility",
            league, base_currency
        );
        self.send(vec![build_embed(
            "Top Spread Opportunities",
            description,
            fields,
            DISCORD.colors.spreads,
        )])
        .await;
    }

    pub async fn send_triangular_candidates(
        &self,
        entries: &[TriangularCandidate],
        league: &str,
        base_currency: &str,
    ) {
        if !self.enabled() || entries.is_empty() {
            return;
        }

        let fields = entries
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let value = format!(
                    "```\nPath:      {} -> {} -> {} -> {}\nReturn:    {:.2}%\nMultiplier: {:.4}\n```",
                    c.path[0], c.path[1], c.path[2], c.path[0], c.inefficiency_pct, c.profit_multiplier
                );
                (format!("#{} Triangular Path", i + 1), value)
            })
            .collect();

        let description = format!(
            "**League:** {}\n**Base Currency:** {}\n\nHistorical price patterns - NOT executable arbitrage",
            league, base_currency
        );
        self.send(vec![build_embed(
            "Top Triangular Cycles",
            description,
            fields,
            DISCORD.colors.triangular,
        )])
        .await;
    }

    pub async fn send_persistent_markets(
        &self,
        entries: &[PersistentMarketEntry],
        league: &str,
        base_currency: &str,
        window_hours: usize,
    ) {
        if !self.enabled() || entries.is_empty() {
            return;
        }

        let fields = entries
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let value = format!(
                    "```\nPersistence: {:.0}% ({}/{} hours)\nAvg Spread:  {:.2}%\nLatest:      {:.2}%\nAvg Volume:  {:.0} {}/hr\n```",
                    m.persistence_ratio * 100.0,
                    m.hours_with_spread,
                    m.observed_hours,
                    m.avg_spread,
                    m.latest_spread,
                    m.avg_volume,
                    base_currency
                );
                (format!("#{} {}", i + 1, m.pair), value)
            })
            .collect();

        let description = format!(
            "**League:** {}\n**Timeframe:** {} hours\n\nMarkets with consistently high spreads",
            league, window_hours
        );
        self.send(vec![build_embed(
            "Persistent Markets",
            description,
            fields,
            DISCORD.colors.persistent,
        )])
        .await;
    }

    pub async fn send_trending_markets(
        &self,
        entries: &[TrendingMarketEntry],
        league: &str,
        base_currency: &str,
        lookback_hours: usize,
    ) {
        if !self.enabled() || entries.is_empty() {
            return;
        }

        let fields = entries
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let value = format!(
                    "```\nCurrent:    {:.2}%\nAverage:    {:.2}%\nChange:     {:+.2}%\nTrend:      {:.4}/hr (widening)\nAvg Volume: {:.0} {}/hr\n```",
                    m.current_spread,
                    m.avg_recent_spread,
                    m.spread_change,
                    m.slope,
                    m.avg_volume,
                    base_currency
                );
                (format!("#{} {}", i + 1, m.pair), value)
            })
            .collect();

        let description = format!(
            "**League:** {}\n**Lookback:** {} hours\n\nMarkets with increasing volatility",
            league, lookback_hours
        );
        self.send(vec![build_embed(
            "Trending Markets",
            description,
            fields,
            DISCORD.colors.trending,
        )])
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("äöü", 2), "äö");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[test]
    fn price_formatting_scales_with_magnitude() {
        assert_eq!(fmt_price(0.0000125), "0.00001250");
        assert_eq!(fmt_price(0.25), "0.2500");
        assert_eq!(fmt_price(155.0), "155.00");
    }

    #[test]
    fn embed_respects_field_cap() {
        let fields: Vec<(String, String)> = (0..40)
            .map(|i| (format!("name {}", i), "value".to_string()))
            .collect();
        let embed = build_embed("t", "d".to_string(), fields, 0xffffff);
        assert_eq!(embed.fields.len(), DISCORD.limits.fields_per_embed);
    }

    #[test]
    fn disabled_notifier_reports_disabled() {
        let notifier = DiscordNotifier::new(None);
        assert!(!notifier.enabled());
    }
}
