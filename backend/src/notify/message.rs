use engine::{AlertEvent, Direction};

/// Renders an alert as a Telegram (legacy Markdown) message.
pub fn render_markdown(event: &AlertEvent) -> String {
    let (emoji, action) = match event.direction {
        Direction::Dump => ("🔴", "Price dropped from High"),
        Direction::Pump => ("🟢", "Price bounced from Low"),
    };

    format!(
        "{emoji} *{asset} {label} ALERT*\n\n\
         {action}\n\
         💵 *Current:* ${current}\n\
         ⚓ *Ref Point:* ${reference}\n\
         ↕️ *Diff:* ${diff}\n\
         (Trigger limit was ${threshold})",
        asset = event.asset,
        label = event.direction.label(),
        current = format_usd(event.current_price),
        reference = format_usd(event.reference_price),
        diff = format_usd(event.diff()),
        threshold = format_usd_whole(event.trigger_threshold),
    )
}

/// Two decimals with thousands separators: `64123.5` -> `64,123.50`.
pub fn format_usd(value: f64) -> String {
    group_thousands(value, 2)
}

/// Rounded to whole units: `63500.4` -> `63,500`.
pub fn format_usd_whole(value: f64) -> String {
    group_thousands(value, 0)
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
