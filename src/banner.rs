//! ASCII-art banner rendering and the persisted banner file.
//!
//! The renderer is a pure transform: an image is decoded, reduced to its
//! luminance channel, and sampled nearest-neighbor onto a character grid
//! using a 10-level brightness ramp. The shell stores the most recently
//! "set" banner as plain text and prints it verbatim at startup.

use anyhow::{Context, Result, ensure};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Name of the persisted banner artifact, relative to the directory the
/// shell is started from.
pub const BANNER_FILE: &str = ".banner.txt";

/// Width, in character cells, of rendered banners.
pub const BANNER_WIDTH: u32 = 60;

/// Terminal character cells are roughly twice as tall as they are wide, so
/// the rendered height is compressed by this factor. Tunable, not derived.
const CELL_ASPECT: u32 = 2;

/// Darkest to brightest.
const BRIGHTNESS_RAMP: &[u8; 10] = b" .:-=+*#%@";

/// Render the image at `path` as an ASCII-art grid `width` characters wide.
///
/// Output height follows from the source aspect ratio divided by
/// [`CELL_ASPECT`], with a minimum of one row. Rows are newline-terminated.
pub fn render(path: &Path, width: u32) -> Result<String> {
    ensure!(width > 0, "banner width must be positive");

    let img = image::open(path)
        .with_context(|| format!("could not load image '{}'", path.display()))?;
    let gray = img.to_luma8();
    let (src_w, src_h) = gray.dimensions();
    ensure!(src_w > 0 && src_h > 0, "image '{}' has no pixels", path.display());

    let out_w = width;
    let out_h = ((src_h as u64 * out_w as u64) / (CELL_ASPECT as u64 * src_w as u64)).max(1) as u32;

    let mut art = String::with_capacity((out_w as usize + 1) * out_h as usize);
    for row in 0..out_h {
        for col in 0..out_w {
            let src_x = (col as u64 * src_w as u64 / out_w as u64) as u32;
            let src_y = (row as u64 * src_h as u64 / out_h as u64) as u32;
            let pixel = gray.get_pixel(src_x, src_y)[0];
            let idx = pixel as usize * (BRIGHTNESS_RAMP.len() - 1) / 255;
            art.push(BRIGHTNESS_RAMP[idx] as char);
        }
        art.push('\n');
    }
    Ok(art)
}

/// Render `image` and persist the art to `dest` for the next startup.
pub fn save(image: &Path, width: u32, dest: &Path) -> Result<()> {
    let art = render(image, width)?;
    fs::write(dest, art).with_context(|| format!("could not write '{}'", dest.display()))
}

/// Delete the persisted banner. Succeeds when no banner file exists.
pub fn clear(dest: &Path) -> Result<()> {
    match fs::remove_file(dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("could not remove '{}'", dest.display())),
    }
}

/// Print the persisted banner verbatim, if one exists.
pub fn print_saved(dest: &Path, out: &mut dyn Write) -> Result<()> {
    let art = match fs::read_to_string(dest) {
        Ok(art) => art,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(e).with_context(|| format!("could not read '{}'", dest.display()));
        }
    };
    out.write_all(art.as_bytes())?;
    writeln!(out)?;
    Ok(())
}
