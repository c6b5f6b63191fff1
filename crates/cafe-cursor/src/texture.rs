//! Tiled RGBA8 texture layout.
//!
//! The GPU samples RGBA8 textures in 4x4 tiles of 64 bytes: the first 32
//! bytes hold alpha/red pairs for the tile's 16 texels, the next 32 hold
//! green/blue pairs. Dimensions are padded to whole tiles.

/// Texels per tile edge.
pub const TILE: usize = 4;
const TILE_BYTES: usize = TILE * TILE * 4;

/// Round `v` up to a multiple of 4.
pub fn align4(v: i32) -> i32 {
    (v + 3) & !3
}

/// Bytes needed for a `w` x `h` RGBA8 texture.
pub fn texture_size(w: u16, h: u16) -> usize {
    let tiles_x = usize::from(w).div_ceil(TILE);
    let tiles_y = usize::from(h).div_ceil(TILE);
    tiles_x * tiles_y * TILE_BYTES
}

/// Convert linear RGBA bytes (`w * 4` bytes per row) to tiled layout.
pub fn rgba_to_tiled(pixels: &[u8], w: u16, h: u16) -> Vec<u8> {
    let (w, h) = (usize::from(w), usize::from(h));
    let mut out = vec![0u8; texture_size(w as u16, h as u16)];
    let tiles_x = w.div_ceil(TILE);
    for ty in 0..h.div_ceil(TILE) {
        for tx in 0..tiles_x {
            let tile = &mut out[(ty * tiles_x + tx) * TILE_BYTES..][..TILE_BYTES];
            for i in 0..TILE * TILE {
                let x = tx * TILE + i % TILE;
                let y = ty * TILE + i / TILE;
                if x >= w || y >= h {
                    continue;
                }
                let p = &pixels[(y * w + x) * 4..][..4];
                tile[i * 2] = p[3];
                tile[i * 2 + 1] = p[0];
                tile[32 + i * 2] = p[1];
                tile[32 + i * 2 + 1] = p[2];
            }
        }
    }
    out
}
