use cotton_source::PositionEncoding;
use tower_lsp_server::ls_types;

/// Pick the position encoding used for the whole session.
///
/// UTF-8 matches the byte offsets the engine works in, so it is taken
/// whenever the client offers it; UTF-16 is what the protocol mandates.
pub fn negotiate_position_encoding(params: &ls_types::InitializeParams) -> PositionEncoding {
    let client_encodings: &[ls_types::PositionEncodingKind] = params
        .capabilities
        .general
        .as_ref()
        .and_then(|general| general.position_encodings.as_ref())
        .map_or(&[], |encodings| encodings.as_slice());

    for preferred in [
        PositionEncoding::Utf8,
        PositionEncoding::Utf32,
        PositionEncoding::Utf16,
    ] {
        if client_encodings
            .iter()
            .any(|kind| position_encoding_from_lsp(kind) == Some(preferred))
        {
            return preferred;
        }
    }

    PositionEncoding::Utf16
}

#[must_use]
pub fn position_encoding_to_lsp(encoding: PositionEncoding) -> ls_types::PositionEncodingKind {
    match encoding {
        PositionEncoding::Utf8 => ls_types::PositionEncodingKind::new("utf-8"),
        PositionEncoding::Utf16 => ls_types::PositionEncodingKind::new("utf-16"),
        PositionEncoding::Utf32 => ls_types::PositionEncodingKind::new("utf-32"),
    }
}

#[must_use]
pub fn position_encoding_from_lsp(kind: &ls_types::PositionEncodingKind) -> Option<PositionEncoding> {
    match kind.as_str() {
        "utf-8" => Some(PositionEncoding::Utf8),
        "utf-16" => Some(PositionEncoding::Utf16),
        "utf-32" => Some(PositionEncoding::Utf32),
        _ => None,
    }
}
