//! Size, content-type and signature policy for binary payloads.

use crate::gateway::ToolError;
use futures_util::StreamExt;
use std::fmt;
use tracing::debug;

/// Default maximum payload size (10 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Default expected content-type category.
pub const DEFAULT_EXPECTED_CONTENT_TYPE: &str = "image/*";

/// Limits applied to every fetched or uploaded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadPolicy {
	/// Maximum size in bytes
	pub max_bytes: u64,
	/// Exact type (`image/png`) or category wildcard (`image/*`)
	pub expected_content_type: String,
}

impl Default for PayloadPolicy {
	fn default() -> Self {
		Self {
			max_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
			expected_content_type: DEFAULT_EXPECTED_CONTENT_TYPE.to_string(),
		}
	}
}

impl PayloadPolicy {
	/// Policy with a custom size limit.
	pub fn with_max_bytes(max_bytes: u64) -> Self {
		Self {
			max_bytes,
			..Self::default()
		}
	}

	/// Whether `content_type` falls in the expected category.
	///
	/// Parameters such as `; charset=...` are ignored.
	pub fn accepts_content_type(&self, content_type: &str) -> bool {
		let actual = content_type
			.split(';')
			.next()
			.unwrap_or_default()
			.trim()
			.to_ascii_lowercase();
		let expected = self.expected_content_type.to_ascii_lowercase();

		match expected.strip_suffix("/*") {
			Some(category) => actual
				.split_once('/')
				.is_some_and(|(kind, sub)| kind == category && !sub.is_empty()),
			None => actual == expected,
		}
	}

	/// Reject content types outside the expected category.
	pub fn check_content_type(&self, content_type: &str) -> Result<(), ToolError> {
		if self.accepts_content_type(content_type) {
			Ok(())
		} else {
			Err(ToolError::invalid_content_type(&self.expected_content_type, content_type))
		}
	}

	/// Reject a size over the limit.
	pub fn check_size(&self, bytes: u64) -> Result<(), ToolError> {
		if bytes > self.max_bytes {
			Err(ToolError::payload_too_large(self.max_bytes, Some(bytes)))
		} else {
			Ok(())
		}
	}

	/// Run the size and signature checks on a complete payload.
	pub fn validate_image(&self, data: &[u8]) -> Result<ImageFormat, ToolError> {
		self.check_size(data.len() as u64)?;
		ImageFormat::sniff(data).ok_or_else(|| {
			ToolError::malformed("payload does not start with a jpeg, png, gif, bmp or webp signature")
		})
	}
}

/// Image formats recognized by signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
	/// JPEG
	Jpeg,
	/// PNG
	Png,
	/// GIF (87a and 89a)
	Gif,
	/// Windows bitmap
	Bmp,
	/// WebP in a RIFF container
	Webp,
}

impl ImageFormat {
	/// Identify the format from the leading bytes.
	pub fn sniff(data: &[u8]) -> Option<Self> {
		if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
			Some(Self::Jpeg)
		} else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
			Some(Self::Png)
		} else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
			Some(Self::Gif)
		} else if data.starts_with(b"BM") && data.len() >= 14 {
			Some(Self::Bmp)
		} else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
			Some(Self::Webp)
		} else {
			None
		}
	}

	/// Map a file extension (case-insensitive, `jpg` included).
	pub fn from_extension(extension: &str) -> Option<Self> {
		match extension.to_ascii_lowercase().as_str() {
			"jpg" | "jpeg" => Some(Self::Jpeg),
			"png" => Some(Self::Png),
			"gif" => Some(Self::Gif),
			"bmp" => Some(Self::Bmp),
			"webp" => Some(Self::Webp),
			_ => None,
		}
	}

	/// Map the extension of a file name or URL path.
	pub fn from_filename(filename: &str) -> Option<Self> {
		let path = filename.split(['?', '#']).next().unwrap_or_default();
		let (_, extension) = path.rsplit_once('.')?;
		Self::from_extension(extension)
	}

	/// Canonical mime type.
	pub fn mime_type(self) -> &'static str {
		match self {
			Self::Jpeg => "image/jpeg",
			Self::Png => "image/png",
			Self::Gif => "image/gif",
			Self::Bmp => "image/bmp",
			Self::Webp => "image/webp",
		}
	}

	/// Canonical file extension.
	pub fn extension(self) -> &'static str {
		match self {
			Self::Jpeg => "jpg",
			Self::Png => "png",
			Self::Gif => "gif",
			Self::Bmp => "bmp",
			Self::Webp => "webp",
		}
	}
}

impl fmt::Display for ImageFormat {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.extension())
	}
}

/// An image downloaded under a [`PayloadPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPayload {
	/// Body bytes
	pub data: Vec<u8>,
	/// Content type declared by the server
	pub content_type: String,
	/// Format identified by signature
	pub format: ImageFormat,
}

impl FetchedPayload {
	/// File name for forwarding: the URL's last segment when it carries a
	/// recognized extension, otherwise `image.<ext>`.
	pub fn filename_for(&self, url: &str) -> String {
		let last = url
			.split(['?', '#'])
			.next()
			.and_then(|path| path.rsplit('/').next())
			.unwrap_or_default();
		if ImageFormat::from_filename(last).is_some() {
			last.to_string()
		} else {
			format!("image.{}", self.format.extension())
		}
	}
}

/// Downloads image URLs, enforcing a [`PayloadPolicy`] while streaming.
#[derive(Debug, Clone)]
pub struct PayloadFetcher {
	http_client: reqwest::Client,
	policy: PayloadPolicy,
}

impl Default for PayloadFetcher {
	fn default() -> Self {
		Self::new(PayloadPolicy::default())
	}
}

impl PayloadFetcher {
	/// Create a fetcher with its own HTTP client.
	pub fn new(policy: PayloadPolicy) -> Self {
		Self::with_client(reqwest::Client::new(), policy)
	}

	/// Create a fetcher sharing an existing HTTP client.
	pub fn with_client(http_client: reqwest::Client, policy: PayloadPolicy) -> Self {
		Self { http_client, policy }
	}

	/// The enforced policy.
	pub fn policy(&self) -> &PayloadPolicy {
		&self.policy
	}

	/// Download `url`.
	///
	/// Checks run in order: HTTP status, declared content type,
	/// `Content-Length`, running body total, signature.
	pub async fn fetch(&self, url: &str) -> Result<FetchedPayload, ToolError> {
		let response = self
			.http_client
			.get(url)
			.send()
			.await
			.map_err(|e| ToolError::transport(format!("image request failed: {}", e)))?;

		if !response.status().is_success() {
			return Err(ToolError::transport(format!(
				"image request failed: HTTP {}",
				response.status()
			)));
		}

		let content_type = response
			.headers()
			.get(reqwest::header::CONTENT_TYPE)
			.and_then(|v| v.to_str().ok())
			.unwrap_or_default()
			.to_string();
		self.policy.check_content_type(&content_type)?;

		if let Some(declared) = response.content_length() {
			self.policy.check_size(declared)?;
		}

		let data = read_limited(response, self.policy.max_bytes).await?;
		let format = self.policy.validate_image(&data)?;
		debug!(url, bytes = data.len(), %format, "image fetched");

		Ok(FetchedPayload {
			data,
			content_type,
			format,
		})
	}
}

/// Read a response body, failing as soon as the running total passes `limit`.
pub async fn read_limited(response: reqwest::Response, limit: u64) -> Result<Vec<u8>, ToolError> {
	let mut body = Vec::new();
	let mut stream = response.bytes_stream();

	while let Some(chunk) = stream.next().await {
		let chunk = chunk.map_err(|e| ToolError::transport(format!("body read failed: {}", e)))?;
		let total = (body.len() + chunk.len()) as u64;
		if total > limit {
			return Err(ToolError::payload_too_large(limit, Some(total)));
		}
		body.extend_from_slice(&chunk);
	}

	Ok(body)
}

#[cfg(test)]
mod tests {
	use super::*;

	const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

	#[test]
	fn test_content_type_wildcard() {
		let policy = PayloadPolicy::default();
		assert!(policy.accepts_content_type("image/png"));
		assert!(policy.accepts_content_type("Image/JPEG; charset=binary"));
		assert!(!policy.accepts_content_type("text/html"));
		assert!(!policy.accepts_content_type("image/"));
		assert!(!policy.accepts_content_type(""));
	}

	#[test]
	fn test_content_type_exact() {
		let policy = PayloadPolicy {
			expected_content_type: "image/png".into(),
			..PayloadPolicy::default()
		};
		assert!(policy.accepts_content_type("image/png"));
		assert!(!policy.accepts_content_type("image/gif"));
		assert_eq!(
			policy.check_content_type("image/gif"),
			Err(ToolError::invalid_content_type("image/png", "image/gif"))
		);
	}

	#[test]
	fn test_size_limit() {
		let policy = PayloadPolicy::with_max_bytes(4);
		assert!(policy.check_size(4).is_ok());
		assert_eq!(policy.check_size(5), Err(ToolError::payload_too_large(4, Some(5))));
	}

	#[test]
	fn test_sniff_signatures() {
		assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
		assert_eq!(ImageFormat::sniff(PNG), Some(ImageFormat::Png));
		assert_eq!(ImageFormat::sniff(b"GIF89a..."), Some(ImageFormat::Gif));
		assert_eq!(ImageFormat::sniff(b"BM\0\0\0\0\0\0\0\0\0\0\0\0"), Some(ImageFormat::Bmp));
		assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
		assert_eq!(ImageFormat::sniff(b"<html>"), None);
		assert_eq!(ImageFormat::sniff(b""), None);
	}

	#[test]
	fn test_validate_image_rejects_garbage() {
		let err = PayloadPolicy::default().validate_image(b"not an image").unwrap_err();
		assert_eq!(err.kind(), "malformed_payload");
	}

	#[test]
	fn test_extensions() {
		assert_eq!(ImageFormat::from_filename("photo.JPG"), Some(ImageFormat::Jpeg));
		assert_eq!(ImageFormat::from_filename("https://cdn/x/y.webp?v=2"), Some(ImageFormat::Webp));
		assert_eq!(ImageFormat::from_filename("archive.tar"), None);
		assert_eq!(ImageFormat::from_filename("noextension"), None);
	}

	#[test]
	fn test_filename_for() {
		let fetched = FetchedPayload {
			data: PNG.to_vec(),
			content_type: "image/png".into(),
			format: ImageFormat::Png,
		};
		assert_eq!(fetched.filename_for("https://cdn.example.com/a/shoe.png?x=1"), "shoe.png");
		assert_eq!(fetched.filename_for("https://cdn.example.com/render"), "image.png");
	}
}
