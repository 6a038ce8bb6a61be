use crate::Error;

const EXTENSION: &str = ".json";

/// Extracts the token id from a collection metadata uri such as `https://metadata.degods.com/g/4924.json`.
///
/// On chain the uri is stored in a fixed size buffer, so anything past the extension (usually NUL
/// padding) is ignored.
pub fn token_id_from_uri(uri: &str) -> Result<u16, Error> {
    let (_, tail) = uri
        .rsplit_once('/')
        .ok_or_else(|| Error::UriMissingSeparator(uri.to_owned()))?;
    let end = tail
        .find(EXTENSION)
        .ok_or_else(|| Error::UriMissingExtension(uri.to_owned()))?;

    tail[..end]
        .parse()
        .map_err(|_| Error::UriInvalidTokenId(uri.to_owned()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_uri() {
        assert_eq!(
            4924,
            token_id_from_uri("https://metadata.degods.com/g/4924.json").unwrap()
        );
        assert_eq!(0, token_id_from_uri("ipfs://abc/0.json").unwrap());
    }

    #[test]
    fn nul_padded_uri() {
        let mut uri = String::from("https://metadata.y00ts.com/y/14.json");
        uri.push_str(&"\0".repeat(164));
        assert_eq!(14, token_id_from_uri(&uri).unwrap());
    }

    #[test]
    fn malformed_uris() {
        assert!(matches!(
            token_id_from_uri("4924.json"),
            Err(Error::UriMissingSeparator(_))
        ));
        assert!(matches!(
            token_id_from_uri("https://metadata.degods.com/g/4924"),
            Err(Error::UriMissingExtension(_))
        ));
        assert!(matches!(
            token_id_from_uri("https://metadata.degods.com/g/dead.json"),
            Err(Error::UriInvalidTokenId(_))
        ));
        // out of range for a u16
        assert!(matches!(
            token_id_from_uri("https://metadata.degods.com/g/70000.json"),
            Err(Error::UriInvalidTokenId(_))
        ));
    }
}
