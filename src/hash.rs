use byteorder::{ByteOrder, LittleEndian};
use crypto::digest::Digest;
use crypto::md5::Md5;

/// Size of an MD5 digest in bytes.
pub const DIGEST_LEN: usize = 16;

/// Number of 32-bit positions carved out of one digest.
pub const ALIGNMENTS: usize = DIGEST_LEN / 4;

/// Alignment used for key queries.
pub const QUERY_ALIGNMENT: usize = 0;

pub type Digest128 = [u8; DIGEST_LEN];

pub fn digest<S>(key: S) -> Digest128
where
    S: AsRef<str>,
{
    let mut hasher = Md5::new();
    hasher.input_str(key.as_ref());

    let mut out = [0_u8; DIGEST_LEN];
    hasher.result(&mut out);
    out
}

/// Returns the 32-bit position built from bytes `[4 * alignment, 4 * alignment + 3]`
/// of the key's digest, read little-endian.
///
/// Panics if `alignment >= ALIGNMENTS`.
pub fn align_hash<S>(key: S, alignment: usize) -> u32
where
    S: AsRef<str>,
{
    let d = digest(key);
    align_digest(&d, alignment)
}

/// All four alignments of the key from a single digest computation.
pub fn alignments<S>(key: S) -> [u32; ALIGNMENTS]
where
    S: AsRef<str>,
{
    let d = digest(key);
    let mut out = [0_u32; ALIGNMENTS];
    for (alignment, position) in out.iter_mut().enumerate() {
        *position = align_digest(&d, alignment);
    }
    out
}

fn align_digest(digest: &Digest128, alignment: usize) -> u32 {
    let offset = alignment * 4;
    LittleEndian::read_u32(&digest[offset..offset + 4])
}
