use fontverter_sfnt::{Reader, WriteBe};

use super::{
    MORE_COMPONENTS, ON_CURVE, OPTION_OVERLAP_SIMPLE_BITMAP, OVERLAP_SIMPLE, REPEAT,
    WE_HAVE_INSTRUCTIONS, X_SAME_OR_POSITIVE, X_SHORT, Y_SAME_OR_POSITIVE, Y_SHORT, bbox_bitmap_size, bit_is_set,
    component_args_size, overlap_bitmap_size, triplet,
};
use crate::{Error, Result, varint::read_255_u16};

/// glyf and loca rebuilt from a transformed glyf table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconstructedGlyf {
    pub glyf: Vec<u8>,
    pub loca: Vec<u8>,
    pub index_format: u16,
    /// xMin of every glyph, 0 for empty ones.
    pub x_mins: Vec<i16>,
}

#[derive(Debug, Clone, Copy)]
struct Point {
    x: i32,
    y: i32,
    on_curve: bool,
}

/// Rebuild glyf and loca from a transformed glyf table.
///
/// Glyphs are written in canonical form: flag repeats wherever possible,
/// short and same-as-previous coordinates wherever the delta allows, and
/// every glyph padded to four bytes.
pub fn reconstruct_glyf(data: &[u8]) -> Result<ReconstructedGlyf> {
    rebuild(data).map_err(Error::in_transform)
}

struct Streams<'a> {
    n_contour: Reader<'a>,
    n_points: Reader<'a>,
    flag: Reader<'a>,
    glyph: Reader<'a>,
    composite: Reader<'a>,
    bbox: Reader<'a>,
    instruction: Reader<'a>,
}

fn rebuild(data: &[u8]) -> Result<ReconstructedGlyf> {
    let mut reader = Reader::new(data);
    reader.skip(2)?; // reserved
    let option_flags = reader.read_u16()?;
    let num_glyphs = reader.read_u16()? as usize;
    let index_format = reader.read_u16()?;
    if index_format > 1 {
        return Err(Error::transform(format!("unknown loca index format {index_format}")));
    }

    let mut sizes = [0usize; 7];
    for size in &mut sizes {
        *size = reader.read_u32()? as usize;
    }
    let [n_contour, n_points, flag, glyph, composite, bbox, instruction] = sizes;
    let mut streams = Streams {
        n_contour: Reader::new(reader.read_bytes(n_contour)?),
        n_points: Reader::new(reader.read_bytes(n_points)?),
        flag: Reader::new(reader.read_bytes(flag)?),
        glyph: Reader::new(reader.read_bytes(glyph)?),
        composite: Reader::new(reader.read_bytes(composite)?),
        bbox: Reader::new(reader.read_bytes(bbox)?),
        instruction: Reader::new(reader.read_bytes(instruction)?),
    };
    let overlap_bitmap = if option_flags & OPTION_OVERLAP_SIMPLE_BITMAP != 0 {
        reader.read_bytes(overlap_bitmap_size(num_glyphs))?
    } else {
        &[]
    };
    let bbox_bitmap = streams.bbox.read_bytes(bbox_bitmap_size(num_glyphs))?;

    let mut glyf = Vec::new();
    let mut offsets = Vec::with_capacity(num_glyphs + 1);
    let mut x_mins = vec![0i16; num_glyphs];

    for (gid, x_min) in x_mins.iter_mut().enumerate() {
        let start = glyf.len();
        offsets.push(start);
        let has_bbox = bit_is_set(bbox_bitmap, gid);

        match streams.n_contour.read_i16()? {
            0 if has_bbox => {
                return Err(Error::transform(format!("empty glyph {gid} has a bounding box")));
            }
            0 => {}
            -1 => write_composite(gid, has_bbox, &mut streams, &mut glyf)?,
            n if n > 0 => {
                let overlap = bit_is_set(overlap_bitmap, gid);
                write_simple(n as u16, has_bbox, overlap, &mut streams, &mut glyf)?;
            }
            n => return Err(Error::transform(format!("glyph {gid} has {n} contours"))),
        }

        if glyf.len() > start {
            *x_min = i16::from_be_bytes([glyf[start + 2], glyf[start + 3]]);
        }
        glyf.pad_to_4();
    }
    offsets.push(glyf.len());

    let loca = write_loca(&offsets, index_format)?;
    Ok(ReconstructedGlyf { glyf, loca, index_format, x_mins })
}

fn write_composite(gid: usize, has_bbox: bool, streams: &mut Streams, glyf: &mut Vec<u8>) -> Result<()> {
    if !has_bbox {
        return Err(Error::transform(format!("composite glyph {gid} has no bounding box")));
    }
    glyf.write_i16(-1);
    glyf.extend_from_slice(streams.bbox.read_bytes(8)?);

    // Measure the component records before copying them out.
    let mut scan = streams.composite.clone();
    let mut have_instructions = false;
    loop {
        let flags = scan.read_u16()?;
        have_instructions |= flags & WE_HAVE_INSTRUCTIONS != 0;
        scan.skip(2 + component_args_size(flags))?;
        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }
    let size = scan.position() - streams.composite.position();
    glyf.extend_from_slice(streams.composite.read_bytes(size)?);

    if have_instructions {
        let len = read_255_u16(&mut streams.glyph)?;
        glyf.write_u16(len);
        glyf.extend_from_slice(streams.instruction.read_bytes(len as usize)?);
    }
    Ok(())
}

fn write_simple(
    n_contours: u16,
    has_bbox: bool,
    overlap: bool,
    streams: &mut Streams,
    glyf: &mut Vec<u8>,
) -> Result<()> {
    let mut end_points = Vec::with_capacity(n_contours as usize);
    let mut end_point = -1i32;
    for _ in 0..n_contours {
        let count = read_255_u16(&mut streams.n_points)?;
        if count == 0 {
            return Err(Error::transform("contour has no points"));
        }
        end_point += i32::from(count);
        if end_point >= 0x10000 {
            return Err(Error::transform("glyph has more than 65535 points"));
        }
        end_points.push(end_point as u16);
    }

    let num_points = (end_point + 1) as usize;
    if num_points > streams.flag.remaining() {
        return Err(Error::transform("flag stream is shorter than the point count"));
    }

    let mut points = Vec::with_capacity(num_points);
    let (mut x, mut y) = (0i32, 0i32);
    for _ in 0..num_points {
        let flag = streams.flag.read_u8()?;
        let (on_curve, dx, dy) = triplet::decode(flag, &mut streams.glyph)?;
        x = x.checked_add(dx).ok_or_else(|| Error::transform("x coordinate overflow"))?;
        y = y.checked_add(dy).ok_or_else(|| Error::transform("y coordinate overflow"))?;
        points.push(Point { x, y, on_curve });
    }
    let instruction_length = read_255_u16(&mut streams.glyph)?;

    glyf.write_u16(n_contours);
    if has_bbox {
        glyf.extend_from_slice(streams.bbox.read_bytes(8)?);
    } else {
        for v in bounds(&points) {
            glyf.write_i16(v as i16);
        }
    }
    for end_point in end_points {
        glyf.write_u16(end_point);
    }
    glyf.write_u16(instruction_length);
    glyf.extend_from_slice(streams.instruction.read_bytes(instruction_length as usize)?);
    store_points(&points, overlap, glyf);
    Ok(())
}

fn bounds(points: &[Point]) -> [i32; 4] {
    let Some(first) = points.first() else {
        return [0; 4];
    };
    points.iter().fold([first.x, first.y, first.x, first.y], |b, p| {
        [b[0].min(p.x), b[1].min(p.y), b[2].max(p.x), b[3].max(p.y)]
    })
}

/// Write flags and coordinates in the most compact standard encoding.
fn store_points(points: &[Point], overlap: bool, glyf: &mut Vec<u8>) {
    let mut flags = Vec::with_capacity(points.len());
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    let mut last_flag = None;
    let mut repeat = 0u8;
    let (mut last_x, mut last_y) = (0i32, 0i32);

    for (i, point) in points.iter().enumerate() {
        let mut flag = if point.on_curve { ON_CURVE } else { 0 };
        if overlap && i == 0 {
            flag |= OVERLAP_SIMPLE;
        }
        flag |= store_delta(point.x - last_x, X_SHORT, X_SAME_OR_POSITIVE, &mut xs);
        flag |= store_delta(point.y - last_y, Y_SHORT, Y_SAME_OR_POSITIVE, &mut ys);

        if last_flag == Some(flag) && repeat != u8::MAX {
            if let Some(previous) = flags.last_mut() {
                *previous |= REPEAT;
            }
            repeat += 1;
        } else {
            if repeat != 0 {
                flags.push(repeat);
            }
            flags.push(flag);
            repeat = 0;
        }
        last_flag = Some(flag);
        (last_x, last_y) = (point.x, point.y);
    }
    if repeat != 0 {
        flags.push(repeat);
    }

    glyf.extend_from_slice(&flags);
    glyf.extend_from_slice(&xs);
    glyf.extend_from_slice(&ys);
}

fn store_delta(delta: i32, short: u8, same_or_positive: u8, out: &mut Vec<u8>) -> u8 {
    if delta == 0 {
        same_or_positive
    } else if -256 < delta && delta < 256 {
        out.push(delta.unsigned_abs() as u8);
        if delta > 0 { short | same_or_positive } else { short }
    } else {
        out.write_i16(delta as i16);
        0
    }
}

fn write_loca(offsets: &[usize], index_format: u16) -> Result<Vec<u8>> {
    let mut loca = Vec::with_capacity(offsets.len() * if index_format == 0 { 2 } else { 4 });
    for &offset in offsets {
        if index_format == 0 {
            let half = u16::try_from(offset / 2)
                .map_err(|_| Error::transform("glyf is too large for a short loca table"))?;
            loca.write_u16(half);
        } else {
            let offset =
                u32::try_from(offset).map_err(|_| Error::transform("glyf is too large for a loca table"))?;
            loca.write_u32(offset);
        }
    }
    Ok(loca)
}
