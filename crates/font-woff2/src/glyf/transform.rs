use fontverter_sfnt::{Reader, WriteBe};
use read_fonts::{
    FontData, FontRead,
    tables::{head::Head, maxp::Maxp},
};

use super::{
    MORE_COMPONENTS, OPTION_OVERLAP_SIMPLE_BITMAP, OVERLAP_SIMPLE, REPEAT, TRANSFORM_HEADER_SIZE,
    WE_HAVE_INSTRUCTIONS, X_SAME_OR_POSITIVE, X_SHORT, Y_SAME_OR_POSITIVE, Y_SHORT, bbox_bitmap_size,
    component_args_size, loca_entry_size, overlap_bitmap_size, set_bit, triplet,
};
use crate::{Error, Result, varint::write_255_u16};

/// Split glyf into the seven transform streams.
///
/// The result only reproduces the input exactly when the input glyphs are
/// in canonical form; callers compare against
/// [`reconstruct_glyf`](super::reconstruct_glyf) before using it.
pub fn transform_glyf(glyf: &[u8], loca: &[u8], head: &[u8], maxp: &[u8]) -> Result<Vec<u8>> {
    let head = Head::read(FontData::new(head)).map_err(|e| Error::transform(format!("unreadable head: {e}")))?;
    let maxp = Maxp::read(FontData::new(maxp)).map_err(|e| Error::transform(format!("unreadable maxp: {e}")))?;
    let index_format = match head.index_to_loc_format() {
        0 => 0,
        1 => 1,
        other => return Err(Error::transform(format!("unknown loca index format {other}"))),
    };

    let num_glyphs = maxp.num_glyphs();
    let offsets = glyph_offsets(loca, glyf.len(), num_glyphs as usize, index_format)?;

    let mut streams = Streams::new(num_glyphs as usize);
    for (gid, range) in offsets.windows(2).enumerate() {
        streams.push_glyph(gid, &glyf[range[0]..range[1]]).map_err(Error::in_transform)?;
    }
    streams.finish(num_glyphs, index_format)
}

fn glyph_offsets(loca: &[u8], glyf_len: usize, num_glyphs: usize, index_format: u16) -> Result<Vec<usize>> {
    let entry_size = loca_entry_size(index_format);
    if loca.len() < (num_glyphs + 1) * entry_size {
        return Err(Error::transform(format!("loca is too short for {num_glyphs} glyphs")));
    }

    let mut reader = Reader::new(loca);
    let mut offsets = Vec::with_capacity(num_glyphs + 1);
    for _ in 0..=num_glyphs {
        let offset = if index_format == 0 {
            usize::from(reader.read_u16()?) * 2
        } else {
            reader.read_u32()? as usize
        };
        if offsets.last().is_some_and(|&last| offset < last) || offset > glyf_len {
            return Err(Error::transform(format!("loca offset {offset} is out of order or past the end of glyf")));
        }
        offsets.push(offset);
    }
    Ok(offsets)
}

#[derive(Default)]
struct Streams {
    n_contour: Vec<u8>,
    n_points: Vec<u8>,
    flag: Vec<u8>,
    glyph: Vec<u8>,
    composite: Vec<u8>,
    bbox_bitmap: Vec<u8>,
    bbox: Vec<u8>,
    instruction: Vec<u8>,
    overlap_bitmap: Vec<u8>,
    has_overlap: bool,
}

impl Streams {
    fn new(num_glyphs: usize) -> Self {
        Self {
            bbox_bitmap: vec![0; bbox_bitmap_size(num_glyphs)],
            overlap_bitmap: vec![0; overlap_bitmap_size(num_glyphs)],
            ..Default::default()
        }
    }

    fn push_glyph(&mut self, gid: usize, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            self.n_contour.write_i16(0);
            return Ok(());
        }

        let mut reader = Reader::new(data);
        let n_contours = reader.read_i16()?;
        let bbox = reader.read_array::<8>()?;
        match n_contours {
            -1 => self.push_composite(gid, bbox, &mut reader),
            n if n > 0 => self.push_simple(gid, n as u16, bbox, &mut reader),
            n => Err(Error::transform(format!("glyph {gid} has {n} contours"))),
        }
    }

    fn push_composite(&mut self, gid: usize, bbox: [u8; 8], reader: &mut Reader) -> Result<()> {
        self.n_contour.write_i16(-1);
        set_bit(&mut self.bbox_bitmap, gid);
        self.bbox.extend_from_slice(&bbox);

        let start = reader.position();
        let mut scan = reader.clone();
        let mut have_instructions = false;
        loop {
            let flags = scan.read_u16()?;
            have_instructions |= flags & WE_HAVE_INSTRUCTIONS != 0;
            scan.skip(2 + component_args_size(flags))?;
            if flags & MORE_COMPONENTS == 0 {
                break;
            }
        }
        self.composite.extend_from_slice(reader.read_bytes(scan.position() - start)?);

        if have_instructions {
            let len = reader.read_u16()?;
            write_255_u16(&mut self.glyph, len);
            self.instruction.extend_from_slice(reader.read_bytes(len as usize)?);
        }
        Ok(())
    }

    fn push_simple(&mut self, gid: usize, n_contours: u16, bbox: [u8; 8], reader: &mut Reader) -> Result<()> {
        self.n_contour.write_u16(n_contours);

        let mut last_end = -1i32;
        for _ in 0..n_contours {
            let end = i32::from(reader.read_u16()?);
            let count = u16::try_from(end - last_end)
                .map_err(|_| Error::transform(format!("glyph {gid} has bad contour end points")))?;
            write_255_u16(&mut self.n_points, count);
            last_end = end;
        }
        let num_points = (last_end + 1) as usize;

        let instruction_length = reader.read_u16()?;
        let instructions = reader.read_bytes(instruction_length as usize)?;

        let mut flags = Vec::with_capacity(num_points);
        while flags.len() < num_points {
            let flag = reader.read_u8()?;
            let count = if flag & REPEAT != 0 { usize::from(reader.read_u8()?) + 1 } else { 1 };
            flags.extend(std::iter::repeat_n(flag, count));
        }
        if flags.len() != num_points {
            return Err(Error::transform(format!("glyph {gid} flag repeat runs past the last point")));
        }
        if flags.first().is_some_and(|flag| flag & OVERLAP_SIMPLE != 0) {
            set_bit(&mut self.overlap_bitmap, gid);
            self.has_overlap = true;
        }

        let xs = read_coordinates(reader, &flags, X_SHORT, X_SAME_OR_POSITIVE)?;
        let ys = read_coordinates(reader, &flags, Y_SHORT, Y_SAME_OR_POSITIVE)?;

        let mut bounds: Option<[i32; 4]> = None;
        let (mut x, mut y) = (0i32, 0i32);
        for ((flag, dx), dy) in flags.iter().zip(xs).zip(ys) {
            triplet::encode(flag & 1 != 0, dx, dy, &mut self.flag, &mut self.glyph)?;
            x += dx;
            y += dy;
            bounds = Some(match bounds {
                Some([x_min, y_min, x_max, y_max]) => [x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y)],
                None => [x, y, x, y],
            });
        }
        write_255_u16(&mut self.glyph, instruction_length);
        self.instruction.extend_from_slice(instructions);

        let mut computed = [0u8; 8];
        for (chunk, value) in computed.chunks_exact_mut(2).zip(bounds.unwrap_or_default()) {
            chunk.copy_from_slice(&(value as i16).to_be_bytes());
        }
        if computed != bbox {
            set_bit(&mut self.bbox_bitmap, gid);
            self.bbox.extend_from_slice(&bbox);
        }
        Ok(())
    }

    fn finish(self, num_glyphs: u16, index_format: u16) -> Result<Vec<u8>> {
        let bbox_size = self.bbox_bitmap.len() + self.bbox.len();
        let sizes = [
            self.n_contour.len(),
            self.n_points.len(),
            self.flag.len(),
            self.glyph.len(),
            self.composite.len(),
            bbox_size,
            self.instruction.len(),
        ];
        let overlap_size = if self.has_overlap { self.overlap_bitmap.len() } else { 0 };

        let mut out = Vec::with_capacity(TRANSFORM_HEADER_SIZE + sizes.iter().sum::<usize>() + overlap_size);
        out.write_u16(0);
        out.write_u16(if self.has_overlap { OPTION_OVERLAP_SIMPLE_BITMAP } else { 0 });
        out.write_u16(num_glyphs);
        out.write_u16(index_format);
        for size in sizes {
            let size = u32::try_from(size).map_err(|_| Error::transform("glyph stream exceeds 4 GiB"))?;
            out.write_u32(size);
        }
        out.extend_from_slice(&self.n_contour);
        out.extend_from_slice(&self.n_points);
        out.extend_from_slice(&self.flag);
        out.extend_from_slice(&self.glyph);
        out.extend_from_slice(&self.composite);
        out.extend_from_slice(&self.bbox_bitmap);
        out.extend_from_slice(&self.bbox);
        out.extend_from_slice(&self.instruction);
        if self.has_overlap {
            out.extend_from_slice(&self.overlap_bitmap);
        }
        Ok(out)
    }
}

/// Decode one axis of a simple glyph's coordinate array into deltas.
fn read_coordinates(reader: &mut Reader, flags: &[u8], short: u8, same_or_positive: u8) -> Result<Vec<i32>> {
    flags
        .iter()
        .map(|&flag| {
            Ok(if flag & short != 0 {
                let value = i32::from(reader.read_u8()?);
                if flag & same_or_positive != 0 { value } else { -value }
            } else if flag & same_or_positive != 0 {
                0
            } else {
                i32::from(reader.read_i16()?)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use fontverter_test_fonts::{Glyph, Point, glyf_and_loca, tables};

    use super::*;
    use crate::glyf::reconstruct_glyf;

    fn transform(glyphs: &[Glyph], long_loca: bool) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        let (glyf, loca) = glyf_and_loca(glyphs, long_loca).unwrap();
        let head = tables::head(0x0001_0000, [0, 0, 1000, 1000], long_loca);
        let maxp = tables::maxp_v0_5(glyphs.len() as u16);
        let transformed = transform_glyf(&glyf, &loca, &head, &maxp).unwrap();
        (glyf, loca, transformed)
    }

    fn triangle() -> Glyph {
        Glyph::simple(vec![vec![Point::on(0, 0), Point::on(500, 0), Point::off(250, 700)]])
    }

    #[test]
    fn test_canonical_glyphs_rebuild_exactly() {
        for long_loca in [false, true] {
            let glyphs = [Glyph::Empty, triangle(), Glyph::Empty];
            let (glyf, loca, transformed) = transform(&glyphs, long_loca);
            let rebuilt = reconstruct_glyf(&transformed).unwrap();
            assert_eq!(rebuilt.glyf, glyf);
            assert_eq!(rebuilt.loca, loca);
            assert_eq!(rebuilt.index_format, u16::from(long_loca));
            assert_eq!(rebuilt.x_mins, [0, 0, 0]);
        }
    }

    #[test]
    fn test_stream_sizes() {
        let (_, _, transformed) = transform(&[Glyph::Empty, triangle()], false);
        let mut reader = Reader::new(&transformed);
        reader.skip(4).unwrap();
        assert_eq!(reader.read_u16().unwrap(), 2);
        assert_eq!(reader.read_u16().unwrap(), 0);
        let sizes: Vec<u32> = (0..7).map(|_| reader.read_u32().unwrap()).collect();
        // two contour counts, one point count, three triplets, empty bbox stream
        assert_eq!(sizes[0], 4);
        assert_eq!(sizes[1], 1);
        assert_eq!(sizes[2], 3);
        assert_eq!(sizes[5], 4);
        assert_eq!(sizes[6], 0);
        assert_eq!(transformed.len(), TRANSFORM_HEADER_SIZE + sizes.iter().sum::<u32>() as usize);
    }

    #[test]
    fn test_explicit_bbox_is_kept() {
        let glyph = match triangle() {
            Glyph::Simple { contours, instructions, overlap, .. } => {
                Glyph::Simple { contours, instructions, overlap, bbox: Some([-10, -10, 600, 800]) }
            }
            other => other,
        };
        let (glyf, _, transformed) = transform(&[glyph], false);
        let rebuilt = reconstruct_glyf(&transformed).unwrap();
        assert_eq!(rebuilt.glyf, glyf);
        assert_eq!(rebuilt.x_mins, [-10]);
    }

    #[test]
    fn test_rejects_short_loca() {
        let (glyf, loca) = glyf_and_loca(&[triangle()], false).unwrap();
        let head = tables::head(0x0001_0000, [0, 0, 1000, 1000], false);
        let maxp = tables::maxp_v0_5(2);
        assert!(matches!(transform_glyf(&glyf, &loca, &head, &maxp), Err(Error::Transform(_))));
    }

    #[test]
    fn test_rejects_decreasing_loca() {
        let glyf = vec![0u8; 8];
        let loca = [0u8, 4, 0, 2];
        let head = tables::head(0x0001_0000, [0, 0, 0, 0], false);
        let maxp = tables::maxp_v0_5(1);
        assert!(transform_glyf(&glyf, &loca, &head, &maxp).is_err());
    }
}
