use crate::path::SuperPath;

/// Extension -> top-level media type.
const TYPES: &[(&str, &str)] = &[
    ("txt", "text"),
    ("md", "text"),
    ("csv", "text"),
    ("html", "text"),
    ("htm", "text"),
    ("css", "text"),
    ("py", "text"),
    ("xml", "text"),
    ("ics", "text"),
    ("png", "image"),
    ("jpg", "image"),
    ("jpeg", "image"),
    ("gif", "image"),
    ("bmp", "image"),
    ("svg", "image"),
    ("webp", "image"),
    ("tif", "image"),
    ("tiff", "image"),
    ("ico", "image"),
    ("heic", "image"),
    ("mp4", "video"),
    ("mkv", "video"),
    ("webm", "video"),
    ("avi", "video"),
    ("mov", "video"),
    ("mpeg", "video"),
    ("mpg", "video"),
    ("mp3", "audio"),
    ("wav", "audio"),
    ("flac", "audio"),
    ("ogg", "audio"),
    ("m4a", "audio"),
    ("aac", "audio"),
    ("opus", "audio"),
    ("pdf", "application"),
    ("json", "application"),
    ("zip", "application"),
    ("tar", "application"),
    ("gz", "application"),
    ("js", "application"),
    ("yaml", "application"),
    ("yml", "application"),
    ("doc", "application"),
    ("docx", "application"),
    ("xlsx", "application"),
    ("npy", "application"),
    ("gpg", "application"),
    ("woff", "font"),
    ("woff2", "font"),
    ("ttf", "font"),
    ("otf", "font"),
];

impl SuperPath {
    /// Top-level media type (`text`, `image`, `video`, ...) guessed from the extension.
    pub fn filetype(&self) -> Option<&'static str> {
        let ext = self.extension()?.to_str()?.to_ascii_lowercase();
        TYPES.iter().find(|(e, _)| *e == ext).map(|(_, t)| *t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_by_extension() {
        assert_eq!(SuperPath::from("a/b.PNG").filetype(), Some("image"));
        assert_eq!(SuperPath::from("song.mp3").filetype(), Some("audio"));
        assert_eq!(SuperPath::from("notes.txt").filetype(), Some("text"));
        assert_eq!(SuperPath::from("noext").filetype(), None);
        assert_eq!(SuperPath::from("x.unknownext").filetype(), None);
    }
}
