//! Resource paths for the supported log layouts.

/// Path of the latest checkpoint in a serverless log.
pub const SERVERLESS_CHECKPOINT: &str = "checkpoint";

/// Path of the latest checkpoint in a checksum database.
pub const SUMDB_CHECKPOINT: &str = "latest";

/// Height of checksum-database tiles.
pub const TILE_HEIGHT: u32 = 8;

/// Number of leaves in a full tile.
pub const TILE_WIDTH: u64 = 1 << TILE_HEIGHT;

/// Path of leaf `index` in a serverless log.
///
/// Leaves are fanned out over five levels:
/// `seq/<index >> 32>/<byte 3>/<byte 2>/<byte 1>/<byte 0>`, hex encoded.
/// The top level is not truncated to one byte.
pub fn seq_path(index: u64) -> String {
    format!(
        "seq/{:02x}/{:02x}/{:02x}/{:02x}/{:02x}",
        index >> 32,
        (index >> 24) & 0xff,
        (index >> 16) & 0xff,
        (index >> 8) & 0xff,
        index & 0xff
    )
}

/// Encode a tile number as three-digit path groups, e.g. `x001/x234/067`.
fn tile_number_path(mut n: u64) -> String {
    let mut path = format!("{:03}", n % 1000);
    while n >= 1000 {
        n /= 1000;
        path = format!("x{:03}/{path}", n % 1000);
    }
    path
}

/// Path of the data tile holding leaf `index` in a tree of `tree_size` leaves.
///
/// Returns `(path, offset)`, where `offset` is the leaf's position inside
/// the tile. The last tile of a tree is partial (`.p/<width>`) unless the tree
/// size is a multiple of the tile width.
pub fn data_tile_path(index: u64, tree_size: u64) -> (String, usize) {
    let n = index / TILE_WIDTH;
    let start = n * TILE_WIDTH;
    let width = tree_size.saturating_sub(start).min(TILE_WIDTH);

    let mut path = format!("tile/{TILE_HEIGHT}/data/{}", tile_number_path(n));
    if width < TILE_WIDTH {
        path.push_str(&format!(".p/{width}"));
    }
    (path, (index - start) as usize)
}

/// Split a data tile into its records.
///
/// Records are separated by a blank line; each returned record keeps its
/// final newline.
pub fn split_data_tile(tile: &[u8]) -> Vec<&[u8]> {
    let mut records = Vec::new();
    let mut rest = tile;
    while !rest.is_empty() {
        match rest.windows(2).position(|w| w == b"\n\n") {
            Some(pos) => {
                records.push(&rest[..pos + 1]);
                rest = &rest[pos + 2..];
            }
            None => {
                records.push(rest);
                break;
            }
        }
    }
    records
}
