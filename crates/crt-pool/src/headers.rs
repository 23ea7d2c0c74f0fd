//! Response header merge rules: duplicate header names other than
//! `Set-Cookie` are merged into one value joined by `", "` in first-seen
//! order; `Set-Cookie` entries are preserved separately.

use http::HeaderMap;

pub fn merge(headers: &HeaderMap) -> Vec<(String, String)> {
	let mut order: Vec<String> = Vec::new();
	let mut grouped: hashbrown::HashMap<String, Vec<String>> = hashbrown::HashMap::new();
	let mut set_cookies: Vec<String> = Vec::new();

	for (name, value) in headers.iter() {
		let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
		if name.as_str().eq_ignore_ascii_case("set-cookie") {
			set_cookies.push(value);
			continue;
		}
		let key = name.as_str().to_string();
		if !grouped.contains_key(&key) {
			order.push(key.clone());
		}
		grouped.entry(key).or_default().push(value);
	}

	let mut out: Vec<(String, String)> = order
		.into_iter()
		.map(|name| {
			let values = grouped.remove(&name).unwrap_or_default();
			let merged = values.join(", ");
			(name, merged)
		})
		.collect();

	for cookie in set_cookies {
		out.push(("Set-Cookie".to_string(), cookie));
	}
	out
}

#[cfg(test)]
#[path = "headers_tests.rs"]
mod tests;
