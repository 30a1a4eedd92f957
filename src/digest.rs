/// Computes the digest the fritz box expects as login response.
/// 1. Concat `challenge` and `password` as "<challenge>-<password>"
/// 2. Convert that to UTF16le
/// 3. MD5 that byte array
/// 4. Render as 32 lowercase hex digits
pub fn digest(challenge: &str, password: &str) -> String {
    let hash_input = format!("{}-{}", challenge, password);
    let bytes: Vec<u8> = hash_input
        .encode_utf16()
        .flat_map(|utf16| utf16.to_le_bytes())
        .collect();
    format!("{:032x}", md5::compute(bytes))
}

/// The `response` query parameter of the second login request.
pub fn challenge_response(challenge: &str, password: &str) -> String {
    format!("{}-{}", challenge, digest(challenge, password))
}
