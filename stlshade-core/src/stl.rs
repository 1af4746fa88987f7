/// STL reader for binary and ASCII files
use std::fs::File;
use std::io::Read;
use std::path::Path;

use nalgebra::Point3;
use nom::{
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    combinator::map,
    multi::{count, many0},
    number::complete::{float, le_f32, le_u32},
    sequence::{delimited, preceded, tuple},
    IResult,
};

use crate::error::StlError;
use crate::geometry::{Mesh, Triangle};

/// Free-form header at the start of a binary file
pub const HEADER_LEN: usize = 80;
/// Header plus the `u32` triangle count
pub const PREAMBLE_LEN: usize = HEADER_LEN + 4;
/// Stored normal, three vertices and the attribute word
pub const FACET_LEN: usize = 50;

const STORED_NORMAL_LEN: usize = 12;
const ATTRIBUTE_LEN: usize = 2;

/// Number of bytes a binary file declaring `triangles` facets needs
pub fn binary_len(triangles: usize) -> usize {
    triangles.saturating_mul(FACET_LEN).saturating_add(PREAMBLE_LEN)
}

/// Parse a binary STL file.
///
/// The stored facet normals and attribute words are skipped. The whole
/// declared facet table must be present, otherwise nothing is returned.
pub fn parse_binary_stl(data: &[u8]) -> Result<Mesh, StlError> {
    let (body, declared) = binary_preamble(data).map_err(|_| StlError::Truncated {
        expected: PREAMBLE_LEN,
        actual: data.len(),
    })?;
    let declared = declared as usize;

    let expected = binary_len(declared);
    if data.len() < expected {
        return Err(StlError::Truncated {
            expected,
            actual: data.len(),
        });
    }

    let (_, triangles) = count(binary_facet, declared)(body).map_err(|_| StlError::Truncated {
        expected,
        actual: data.len(),
    })?;

    Ok(Mesh { triangles })
}

fn binary_preamble(input: &[u8]) -> IResult<&[u8], u32> {
    preceded(take(HEADER_LEN), le_u32)(input)
}

fn binary_point(input: &[u8]) -> IResult<&[u8], Point3<f32>> {
    map(tuple((le_f32, le_f32, le_f32)), |(x, y, z)| Point3::new(x, y, z))(input)
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], Triangle> {
    delimited(
        take(STORED_NORMAL_LEN),
        map(
            tuple((binary_point, binary_point, binary_point)),
            |(p0, p1, p2)| Triangle::new(p0, p1, p2),
        ),
        take(ATTRIBUTE_LEN),
    )(input)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Mesh, StlError> {
    match ascii_solid(input) {
        Ok((_, triangles)) => Ok(Mesh { triangles }),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(StlError::Ascii(format!(
            "{:?} at byte {}",
            e.code,
            input.len() - e.input.len()
        ))),
        Err(nom::Err::Incomplete(_)) => {
            Err(StlError::Ascii("unexpected end of input".to_string()))
        }
    }
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<Triangle>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _name) = not_line_ending(input)?;
    let (input, triangles) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    let (input, _) = not_line_ending(input)?;
    Ok((input, triangles))
}

fn ascii_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, _stored_normal) = ascii_triple(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, (p0, p1, p2)) = tuple((ascii_vertex, ascii_vertex, ascii_vertex))(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, Triangle::new(p0, p1, p2)))
}

fn ascii_vertex(input: &str) -> IResult<&str, Point3<f32>> {
    preceded(preceded(multispace0, tag("vertex")), ascii_triple)(input)
}

fn ascii_triple(input: &str) -> IResult<&str, Point3<f32>> {
    let (input, _) = multispace1(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Point3::new(x, y, z)))
}

/// Detect and parse an STL file (binary or ASCII).
///
/// Binary headers are allowed to start with `solid` too, so a failed ASCII
/// parse falls back to binary. Text never contains a NUL byte, so input with
/// one is only ever read as binary. If both parsers fail the ASCII error is
/// reported.
pub fn parse_stl(data: &[u8]) -> Result<Mesh, StlError> {
    let mut ascii_error = None;

    if data.starts_with(b"solid") && !data.contains(&0) {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(mesh) => {
                    log::debug!("parsed {} facets as ASCII STL", mesh.len());
                    return Ok(mesh);
                }
                Err(e) => {
                    log::debug!("not ASCII STL ({}), trying binary", e);
                    ascii_error = Some(e);
                }
            }
        }
    }

    parse_binary_stl(data).map_err(|binary_error| ascii_error.unwrap_or(binary_error))
}

/// Read a whole STL stream and parse it
pub fn read_stl<R: Read>(mut reader: R) -> Result<Mesh, StlError> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    parse_stl(&data)
}

/// Open and parse an STL file
pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<Mesh, StlError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| StlError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mesh = read_stl(file)?;
    log::info!("loaded {} triangles from {}", mesh.len(), path.display());
    Ok(mesh)
}
