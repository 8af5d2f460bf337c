// Series color allocation

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Display color for a series, as `#RRGGBB`.
///
/// The color is a stable hash of the label, so a series keeps its color across
/// recomputations. Different labels may still collide; only the label
/// identifies a series.
pub fn allocate_color(label: &str) -> String {
    let hash = label.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    });
    // fold the top byte in so short labels still spread over all channels
    let rgb = (hash ^ (hash >> 24)) & 0x00ff_ffff;
    format!("#{:06x}", rgb)
}
