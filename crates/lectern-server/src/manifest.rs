//! HLS playlist rewriting.
//!
//! An `.m3u8` playlist references child playlists and segments by relative
//! path. Serving the file as-is would hand the player direct, ungated paths,
//! so every relative reference is rewritten to an absolute URL that routes
//! back through the token-gated endpoint with the same token.
//!
//! The transform is deliberately line-oriented rather than a full M3U8
//! parse: tag/comment lines and already-absolute URLs pass through
//! untouched, everything else is treated as a relative reference.

/// Rewrite all relative references in `playlist` to absolute URLs under
/// `token_base_url`.
///
/// `token_base_url` is the token-gated endpoint for one token, without a
/// trailing slash (e.g. `https://host/api/hls/<token>`).
pub fn rewrite_playlist(playlist: &str, token_base_url: &str) -> String {
    let base = token_base_url.trim_end_matches('/');
    let mut out = String::with_capacity(playlist.len() + 128);

    for line in playlist.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || is_absolute_url(trimmed) {
            out.push_str(line);
        } else {
            out.push_str(base);
            out.push('/');
            out.push_str(trimmed);
        }
        out.push('\n');
    }

    if !playlist.ends_with('\n') {
        out.pop();
    }

    out
}

fn is_absolute_url(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://127.0.0.1:8080/api/hls/abc-123";

    #[test]
    fn master_playlist_variants_are_rewritten() {
        let input = "#EXTM3U\n\
                     #EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360\n\
                     360p.m3u8\n\
                     #EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720\n\
                     720p.m3u8\n";
        let out = rewrite_playlist(input, BASE);

        assert!(out.contains(&format!("{BASE}/360p.m3u8")));
        assert!(out.contains(&format!("{BASE}/720p.m3u8")));
        // Tag lines are untouched.
        assert!(out.contains("#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360"));
    }

    #[test]
    fn media_playlist_segments_are_rewritten() {
        let input = "#EXTM3U\n\
                     #EXT-X-TARGETDURATION:6\n\
                     #EXTINF:6.0,\n\
                     segment_000.ts\n\
                     #EXTINF:6.0,\n\
                     segment_001.ts\n\
                     #EXT-X-ENDLIST\n";
        let out = rewrite_playlist(input, BASE);

        for line in out.lines() {
            if line.starts_with('#') || line.is_empty() {
                continue;
            }
            assert!(
                line.starts_with(BASE),
                "non-comment line not rewritten: {line}"
            );
        }
        assert!(out.contains(&format!("{BASE}/segment_000.ts")));
        assert!(out.contains(&format!("{BASE}/segment_001.ts")));
    }

    #[test]
    fn absolute_urls_pass_through_unchanged() {
        let input = "#EXTM3U\nhttps://cdn.example.com/remote.ts\nHTTP://UPPER.example.com/a.ts\n";
        let out = rewrite_playlist(input, BASE);
        assert!(out.contains("https://cdn.example.com/remote.ts"));
        assert!(out.contains("HTTP://UPPER.example.com/a.ts"));
        assert!(!out.contains(&format!("{BASE}/https")));
    }

    #[test]
    fn blank_lines_and_trailing_newline_preserved() {
        let input = "#EXTM3U\n\nsegment.ts\n";
        let out = rewrite_playlist(input, BASE);
        assert_eq!(
            out,
            format!("#EXTM3U\n\n{BASE}/segment.ts\n")
        );

        let no_trailing = "#EXTM3U\nsegment.ts";
        let out = rewrite_playlist(no_trailing, BASE);
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn rewriting_is_idempotent() {
        let input = "#EXTM3U\n#EXTINF:6.0,\nsegment_000.ts\n";
        let once = rewrite_playlist(input, BASE);
        let twice = rewrite_playlist(&once, BASE);
        assert_eq!(once, twice);
    }

    #[test]
    fn subdirectory_references_are_kept_relative_to_base() {
        let input = "v0/segment_000.ts\n";
        let out = rewrite_playlist(input, BASE);
        assert_eq!(out, format!("{BASE}/v0/segment_000.ts\n"));
    }
}
