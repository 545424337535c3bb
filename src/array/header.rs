//! `.npy` preamble and header dictionary
//!
//! Layout: the magic string `\x93NUMPY`, a two-byte version, a little-endian
//! header length (2 bytes for version 1, 4 bytes for versions 2 and 3), then a
//! Python dict literal padded with spaces and terminated by `\n`.

use super::dtype::Dtype;
use super::error::ArrayError;

pub const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Total preamble + header length is padded to a multiple of this
const HEADER_ALIGN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub dtype: Dtype,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

impl Header {
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    #[must_use]
    pub fn data_len(&self) -> usize {
        self.element_count() * self.dtype.element.size()
    }

    /// Serialize as a version 1.0 preamble + header
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let shape = match self.shape.as_slice() {
            [single] => format!("({single},)"),
            dims => {
                let parts: Vec<String> = dims.iter().map(ToString::to_string).collect();
                format!("({})", parts.join(", "))
            }
        };
        let fortran = if self.fortran_order { "True" } else { "False" };
        let mut dict = format!(
            "{{'descr': '{}', 'fortran_order': {fortran}, 'shape': {shape}, }}",
            self.dtype
        );

        // magic + version + u16 length + dict + '\n'
        let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
        let padding = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
        dict.extend(std::iter::repeat_n(' ', padding));
        dict.push('\n');

        let mut out = Vec::with_capacity(unpadded + padding);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&[1, 0]);
        // Fits: the dict is a few dozen bytes plus < 64 bytes of padding
        out.extend_from_slice(&(dict.len() as u16).to_le_bytes());
        out.extend_from_slice(dict.as_bytes());
        out
    }
}

/// Parse the preamble and header from the start of a `.npy` buffer.
///
/// Returns the header and the offset at which array data begins.
pub fn parse_preamble(bytes: &[u8]) -> Result<(Header, usize), ArrayError> {
    if bytes.len() < MAGIC.len() + 2 || &bytes[..MAGIC.len()] != MAGIC {
        return Err(ArrayError::BadMagic);
    }

    let (major, minor) = (bytes[6], bytes[7]);
    let (len_bytes, header_start) = match major {
        1 => (2, 10),
        2 | 3 => (4, 12),
        _ => return Err(ArrayError::UnsupportedVersion { major, minor }),
    };

    if bytes.len() < header_start {
        return Err(ArrayError::header("file ends inside the preamble"));
    }
    let header_len = if len_bytes == 2 {
        usize::from(u16::from_le_bytes([bytes[8], bytes[9]]))
    } else {
        u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize
    };

    let data_start = header_start + header_len;
    let raw = bytes
        .get(header_start..data_start)
        .ok_or_else(|| ArrayError::header("file ends inside the header"))?;
    let text = std::str::from_utf8(raw)
        .map_err(|_| ArrayError::header("header is not valid text"))?;

    Ok((parse_header_dict(text)?, data_start))
}

/// Parse the header dict, e.g. `{'descr': '<f8', 'fortran_order': False, 'shape': (3, 2, 2), }`
pub fn parse_header_dict(text: &str) -> Result<Header, ArrayError> {
    let text = text.trim();
    let body = text
        .strip_prefix('{')
        .and_then(|t| t.strip_suffix('}'))
        .ok_or_else(|| ArrayError::header("header is not a dict literal"))?;

    let descr = quoted_value(value_after_key(body, "descr")?)?;
    let dtype = descr
        .parse::<Dtype>()
        .map_err(|()| ArrayError::UnsupportedDtype(descr.to_string()))?;

    let fortran_order = {
        let value = value_after_key(body, "fortran_order")?;
        if value.starts_with("True") {
            true
        } else if value.starts_with("False") {
            false
        } else {
            return Err(ArrayError::header("fortran_order must be True or False"));
        }
    };

    let shape = parse_shape(value_after_key(body, "shape")?)?;

    Ok(Header {
        dtype,
        fortran_order,
        shape,
    })
}

/// Slice of `body` starting right after `'key':`
fn value_after_key<'a>(body: &'a str, key: &str) -> Result<&'a str, ArrayError> {
    let pos = [format!("'{key}'"), format!("\"{key}\"")]
        .iter()
        .find_map(|quoted| body.find(quoted.as_str()).map(|p| p + quoted.len()))
        .ok_or_else(|| ArrayError::header(format!("missing key '{key}'")))?;

    body[pos..]
        .trim_start()
        .strip_prefix(':')
        .map(str::trim_start)
        .ok_or_else(|| ArrayError::header(format!("missing ':' after key '{key}'")))
}

fn quoted_value(value: &str) -> Result<&str, ArrayError> {
    let quote = value
        .chars()
        .next()
        .filter(|c| *c == '\'' || *c == '"')
        .ok_or_else(|| ArrayError::header("descr is not a string"))?;
    let rest = &value[1..];
    let end = rest
        .find(quote)
        .ok_or_else(|| ArrayError::header("unterminated descr string"))?;
    Ok(&rest[..end])
}

fn parse_shape(value: &str) -> Result<Vec<usize>, ArrayError> {
    let inner = value
        .strip_prefix('(')
        .and_then(|v| v.find(')').map(|end| &v[..end]))
        .ok_or_else(|| ArrayError::header("shape is not a tuple"))?;

    inner
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            // Python 2 era writers emit long literals such as `3L`
            dim.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|_| ArrayError::header(format!("invalid shape dimension '{dim}'")))
        })
        .collect()
}
