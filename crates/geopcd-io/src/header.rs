use std::collections::HashSet;
use std::fmt;
use std::io::BufRead;

use crate::error::PcdError;

/// Field name PCL writes for padding bytes; it may repeat within a header.
const PADDING_FIELD: &str = "_";

/// The encoding of the data section, as named by the `DATA` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PcdEncoding {
    /// `DATA ascii`
    Ascii,
    /// `DATA binary`, packed little-endian records.
    Binary,
    /// `DATA binary_compressed`
    BinaryCompressed,
    /// Any other keyword.
    Other(String),
}

impl PcdEncoding {
    fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "ascii" => Self::Ascii,
            "binary" => Self::Binary,
            "binary_compressed" => Self::BinaryCompressed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PcdEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascii => write!(f, "ascii"),
            Self::Binary => write!(f, "binary"),
            Self::BinaryCompressed => write!(f, "binary_compressed"),
            Self::Other(keyword) => write!(f, "{keyword}"),
        }
    }
}

/// Describes one field of a point record as declared by the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// The field name, e.g. `x` or `rgb`.
    pub name: String,
    /// Size in bytes of one element.
    pub byte_size: usize,
    /// PCD type: 'F' = float, 'U' = unsigned int, 'I' = signed int.
    pub type_tag: char,
    /// Number of elements per record.
    pub count: usize,
}

/// A parsed PCD header.
///
/// The header keeps the exact bytes it was parsed from; serializing a header
/// hands those bytes back instead of regenerating the text, so comments and
/// lines this crate does not interpret survive a rewrite untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PcdHeader {
    version: Option<String>,
    fields: Vec<FieldDescriptor>,
    width: usize,
    height: usize,
    viewpoint: Option<[f64; 7]>,
    num_points: usize,
    encoding: PcdEncoding,
    raw: Vec<u8>,
}

impl PcdHeader {
    /// The `VERSION` value, if declared.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The field descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// The `WIDTH` value; defaults to the number of points.
    pub fn width(&self) -> usize {
        self.width
    }

    /// The `HEIGHT` value; defaults to 1.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The `VIEWPOINT` value (`tx ty tz qw qx qy qz`), if declared.
    pub fn viewpoint(&self) -> Option<&[f64; 7]> {
        self.viewpoint.as_ref()
    }

    /// The number of point records in the data section.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// The data section encoding.
    pub fn encoding(&self) -> &PcdEncoding {
        &self.encoding
    }

    /// The header bytes exactly as read, up to and including the `DATA` line.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Number of bytes preceding the data section.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.raw.len()
    }
}

/// Parse a PCD header from the start of `raw`.
///
/// Returns the header and the number of bytes it occupies, i.e. the offset of
/// the data section within `raw`.
///
/// Example:
///
/// ```
/// use geopcd_io::parse_header;
///
/// let raw = b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nPOINTS 0\nDATA binary\n";
/// let (header, len) = parse_header(raw).unwrap();
/// assert_eq!(header.num_points(), 0);
/// assert_eq!(len, raw.len());
/// ```
pub fn parse_header(raw: &[u8]) -> Result<(PcdHeader, usize), PcdError> {
    let mut reader = raw;
    let header = read_header(&mut reader)?;
    let len = header.byte_len();
    Ok((header, len))
}

/// Serialize a header back to bytes.
///
/// This is the exact byte sequence [`parse_header`] consumed.
pub fn serialize_header(header: &PcdHeader) -> Vec<u8> {
    header.raw.clone()
}

/// Read a PCD header, leaving `reader` positioned at the first byte of the
/// data section.
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<PcdHeader, PcdError> {
    let mut raw = Vec::new();
    let mut line_buf = Vec::new();

    let mut version = None;
    let mut names: Option<Vec<String>> = None;
    let mut sizes: Option<Vec<usize>> = None;
    let mut types: Option<Vec<char>> = None;
    let mut counts: Option<Vec<usize>> = None;
    let mut width = None;
    let mut height = None;
    let mut viewpoint = None;
    let mut points = None;

    let encoding = loop {
        line_buf.clear();
        let n = reader.read_until(b'\n', &mut line_buf)?;
        if n == 0 {
            return Err(PcdError::MalformedHeader(
                "header ended before the DATA line".into(),
            ));
        }
        raw.extend_from_slice(&line_buf);

        let line = std::str::from_utf8(&line_buf)
            .map_err(|_| PcdError::MalformedHeader("header line is not valid text".into()))?
            .trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut it = line.split_whitespace();
        let Some(keyword) = it.next() else {
            continue;
        };

        match keyword {
            "VERSION" => version = it.next().map(String::from),
            "FIELDS" | "COLUMNS" => names = Some(it.map(String::from).collect()),
            "SIZE" => sizes = Some(parse_list(keyword, it)?),
            "TYPE" | "TYPES" => {
                types = Some(
                    it.map(|token| {
                        let mut chars = token.chars();
                        match (chars.next(), chars.next()) {
                            (Some(tag), None) => Ok(tag),
                            _ => Err(PcdError::MalformedHeader(format!(
                                "invalid TYPE token '{token}'"
                            ))),
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                )
            }
            "COUNT" => counts = Some(parse_list(keyword, it)?),
            "WIDTH" => width = Some(parse_single(keyword, it)?),
            "HEIGHT" => height = Some(parse_single(keyword, it)?),
            "POINTS" => points = Some(parse_single(keyword, it)?),
            "VIEWPOINT" => {
                let values = it
                    .map(|v| v.parse::<f64>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| PcdError::MalformedHeader("invalid VIEWPOINT value".into()))?;
                let values: [f64; 7] = values.try_into().map_err(|_| {
                    PcdError::MalformedHeader("VIEWPOINT must hold 7 values".into())
                })?;
                viewpoint = Some(values);
            }
            "DATA" => {
                let keyword = it.next().ok_or_else(|| {
                    PcdError::MalformedHeader("DATA line names no encoding".into())
                })?;
                break PcdEncoding::from_keyword(keyword);
            }
            _ => log::debug!("Ignoring unknown PCD header keyword: {keyword}"),
        }
    };

    if encoding != PcdEncoding::Binary {
        return Err(PcdError::UnsupportedEncoding(encoding));
    }

    let names = names.ok_or_else(|| missing("FIELDS"))?;
    let sizes = sizes.ok_or_else(|| missing("SIZE"))?;
    let types = types.ok_or_else(|| missing("TYPE"))?;
    let num_points = points.ok_or_else(|| missing("POINTS"))?;

    if names.is_empty() {
        return Err(PcdError::MalformedHeader("FIELDS declares no fields".into()));
    }

    // If COUNT is omitted, PCD defines the count of every field as 1
    let counts = counts.unwrap_or_else(|| vec![1; names.len()]);

    for (keyword, len) in [
        ("SIZE", sizes.len()),
        ("TYPE", types.len()),
        ("COUNT", counts.len()),
    ] {
        if len != names.len() {
            return Err(PcdError::MalformedHeader(format!(
                "{keyword} has {len} entries for {} fields",
                names.len()
            )));
        }
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(names.len());
    for (((name, byte_size), type_tag), count) in names
        .into_iter()
        .zip(sizes)
        .zip(types)
        .zip(counts)
    {
        if count == 0 {
            return Err(PcdError::MalformedHeader(format!(
                "field '{name}' has a COUNT of 0"
            )));
        }
        if name != PADDING_FIELD && !seen.insert(name.clone()) {
            return Err(PcdError::MalformedHeader(format!(
                "field '{name}' is declared twice"
            )));
        }
        fields.push(FieldDescriptor {
            name,
            byte_size,
            type_tag,
            count,
        });
    }

    Ok(PcdHeader {
        version,
        fields,
        width: width.unwrap_or(num_points),
        height: height.unwrap_or(1),
        viewpoint,
        num_points,
        encoding,
        raw,
    })
}

fn missing(keyword: &str) -> PcdError {
    PcdError::MalformedHeader(format!("missing {keyword} line"))
}

fn parse_list<'a>(
    keyword: &str,
    tokens: impl Iterator<Item = &'a str>,
) -> Result<Vec<usize>, PcdError> {
    tokens
        .map(|v| {
            v.parse::<usize>().map_err(|_| {
                PcdError::MalformedHeader(format!("invalid {keyword} value '{v}'"))
            })
        })
        .collect()
}

fn parse_single<'a>(
    keyword: &str,
    mut tokens: impl Iterator<Item = &'a str>,
) -> Result<usize, PcdError> {
    let token = tokens
        .next()
        .ok_or_else(|| PcdError::MalformedHeader(format!("{keyword} has no value")))?;
    token
        .parse::<usize>()
        .map_err(|_| PcdError::MalformedHeader(format!("invalid {keyword} value '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const XYZ_HEADER: &[u8] = b"# .PCD v0.7 - Point Cloud Data file format
VERSION 0.7
FIELDS x y z intensity
SIZE 4 4 4 2
TYPE F F F U
COUNT 1 1 1 1
WIDTH 10
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 10
DATA binary
";

    #[test]
    fn parses_valid_binary_header() -> Result<(), PcdError> {
        let (header, len) = parse_header(XYZ_HEADER)?;
        assert_eq!(len, XYZ_HEADER.len());
        assert_eq!(header.version(), Some("0.7"));
        assert_eq!(header.num_points(), 10);
        assert_eq!(header.width(), 10);
        assert_eq!(header.height(), 1);
        assert_eq!(header.viewpoint(), Some(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]));
        assert_eq!(header.encoding(), &PcdEncoding::Binary);
        assert_eq!(header.fields().len(), 4);
        assert_eq!(
            header.fields()[3],
            FieldDescriptor {
                name: "intensity".into(),
                byte_size: 2,
                type_tag: 'U',
                count: 1,
            }
        );
        Ok(())
    }

    #[test]
    fn stops_at_data_line() -> Result<(), PcdError> {
        let mut raw = XYZ_HEADER.to_vec();
        raw.extend_from_slice(&[0xFF, b'\n', 0x00, 0x01]);
        let (header, len) = parse_header(&raw)?;
        assert_eq!(len, XYZ_HEADER.len());
        assert_eq!(header.as_bytes(), XYZ_HEADER);
        Ok(())
    }

    #[test]
    fn roundtrip_preserves_bytes() -> Result<(), PcdError> {
        let raw = b"# comment kept\r\nFIELDS x y z\r\nSIZE 4 4 4\r\nTYPE F F F\r\nPOINTS 3\r\nDATA binary\r\n";
        let (header, len) = parse_header(raw)?;
        let bytes = serialize_header(&header);
        assert_eq!(bytes, raw.to_vec());

        let (reparsed, relen) = parse_header(&bytes)?;
        assert_eq!(reparsed, header);
        assert_eq!(relen, len);
        Ok(())
    }

    #[test]
    fn defaults_when_optional_lines_are_absent() -> Result<(), PcdError> {
        let raw = b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nPOINTS 7\nDATA binary\n";
        let (header, _) = parse_header(raw)?;
        assert!(header.fields().iter().all(|f| f.count == 1));
        assert_eq!(header.width(), 7);
        assert_eq!(header.height(), 1);
        assert_eq!(header.version(), None);
        assert_eq!(header.viewpoint(), None);
        Ok(())
    }

    #[test]
    fn fails_on_ascii_or_non_binary() {
        for keyword in ["ascii", "binary_compressed", "weird"] {
            let raw = format!(
                "FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nPOINTS 1\nDATA {keyword}\n"
            );
            let err = parse_header(raw.as_bytes()).unwrap_err();
            assert!(matches!(err, PcdError::UnsupportedEncoding(_)), "{keyword}: {err}");
        }
    }

    #[test]
    fn fails_on_missing_lines() {
        let cases: [&[u8]; 4] = [
            b"SIZE 4 4 4\nTYPE F F F\nPOINTS 1\nDATA binary\n",
            b"FIELDS x y z\nTYPE F F F\nPOINTS 1\nDATA binary\n",
            b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nDATA binary\n",
            b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nPOINTS 1\n",
        ];
        for raw in cases {
            assert!(matches!(
                parse_header(raw),
                Err(PcdError::MalformedHeader(_))
            ));
        }
    }

    #[test]
    fn fails_on_inconsistent_token_counts() {
        let raw = b"FIELDS x y z\nSIZE 4 4\nTYPE F F F\nPOINTS 1\nDATA binary\n";
        assert!(matches!(
            parse_header(raw),
            Err(PcdError::MalformedHeader(_))
        ));

        let raw = b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1 1\nPOINTS 1\nDATA binary\n";
        assert!(matches!(
            parse_header(raw),
            Err(PcdError::MalformedHeader(_))
        ));
    }

    #[test]
    fn fails_on_non_integer_tokens() {
        let raw = b"FIELDS x y z\nSIZE 4 4.0 4\nTYPE F F F\nPOINTS 1\nDATA binary\n";
        assert!(matches!(
            parse_header(raw),
            Err(PcdError::MalformedHeader(_))
        ));

        let raw = b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nPOINTS many\nDATA binary\n";
        assert!(matches!(
            parse_header(raw),
            Err(PcdError::MalformedHeader(_))
        ));
    }

    #[test]
    fn read_header_leaves_reader_at_data() -> Result<(), Box<dyn std::error::Error>> {
        use std::io::{Read, Write};

        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(XYZ_HEADER)?;
        file.write_all(&[1, 2, 3, 4])?;

        let mut reader = std::io::BufReader::new(std::fs::File::open(file.path())?);
        let header = read_header(&mut reader)?;
        assert_eq!(header.byte_len(), XYZ_HEADER.len());

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        assert_eq!(data, vec![1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn rejects_duplicate_names_but_allows_padding() {
        let raw = b"FIELDS x x z\nSIZE 4 4 4\nTYPE F F F\nPOINTS 1\nDATA binary\n";
        assert!(matches!(
            parse_header(raw),
            Err(PcdError::MalformedHeader(_))
        ));

        let raw = b"FIELDS x y z _ _\nSIZE 4 4 4 1 1\nTYPE F F F U U\nPOINTS 1\nDATA binary\n";
        assert!(parse_header(raw).is_ok());
    }
}
