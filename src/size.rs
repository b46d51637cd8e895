//! Human-readable byte sizes

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format `bytes` in the largest unit whose divisor does not exceed it,
/// rounded half-up to two decimals: `18.00 B`, `1.50 KB`, `2.00 MB`.
pub fn readable_size(bytes: u64) -> String {
    let mut unit = 0;
    while unit + 1 < UNITS.len() && 1024u64.pow(unit as u32 + 1) <= bytes {
        unit += 1;
    }

    let divisor = 1024u128.pow(unit as u32);
    // Hundredths, rounded half-up
    let hundredths = (bytes as u128 * 200 + divisor) / (2 * divisor);

    format!("{}.{:02} {}", hundredths / 100, hundredths % 100, UNITS[unit])
}
