use crate::log_page_name;
use std::io::Write;

const ROW: usize = 16;

/// Raw dump of a page nobody knows how to decode, or that the user asked to
/// see undecoded.
///
/// Trailing all-zero rows are folded into a single `*` line.
pub fn dump(page: u8, buf: &[u8], writer: &mut impl Write) -> std::io::Result<()> {
    writer.write_fmt(format_args!(
        "{} (page 0x{:02x}), {} bytes\n",
        log_page_name(page).unwrap_or("Unknown Log Page"),
        page,
        buf.len()
    ))?;

    let used = buf.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    let rows = (used + ROW - 1) / ROW;

    for (i, row) in buf.chunks(ROW).take(rows).enumerate() {
        write_row(writer, i * ROW, row)?;
    }

    if rows * ROW < buf.len() {
        writer.write_fmt(format_args!("*\n"))?;
    }

    Ok(())
}

fn write_row(writer: &mut impl Write, offset: usize, bytes: &[u8]) -> std::io::Result<()> {
    writer.write_fmt(format_args!("0x{:04x}:", offset))?;
    for byte in bytes {
        writer.write_fmt(format_args!(" {:02x}", byte))?;
    }
    writer.write_fmt(format_args!("\n"))?;
    Ok(())
}
