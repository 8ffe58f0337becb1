use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::domain::entities::page::{PageRequest, PageResult};
use crate::domain::error::FetchError;

/// Decodes a listing body into a page. The `items`/`total` pair may sit at
/// the top level or inside a `data` object.
pub fn parse_page<T: DeserializeOwned>(
    body: &str,
    request: &PageRequest,
) -> Result<PageResult<T>, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| FetchError::MalformedResponse(format!("body is not json: {err}")))?;
    let page = locate_page(&value)
        .ok_or_else(|| FetchError::MalformedResponse("missing `items`".to_string()))?;

    let raw_items = page
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::MalformedResponse("`items` is not an array".to_string()))?;
    let total = page
        .get("total")
        .ok_or_else(|| FetchError::MalformedResponse("missing `total`".to_string()))?
        .as_u64()
        .ok_or_else(|| {
            FetchError::MalformedResponse("`total` is not a non-negative integer".to_string())
        })?;

    if raw_items.len() > request.size as usize {
        return Err(FetchError::MalformedResponse(format!(
            "{} items returned for a page of {}",
            raw_items.len(),
            request.size
        )));
    }

    let items = raw_items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            T::deserialize(item).map_err(|err| {
                FetchError::MalformedResponse(format!("item {idx} could not be decoded: {err}"))
            })
        })
        .collect::<Result<Vec<T>, FetchError>>()?;

    Ok(PageResult::new(items, request.page, request.size, total))
}

fn locate_page(value: &Value) -> Option<&Map<String, Value>> {
    let object = value.as_object()?;
    if object.contains_key("items") {
        return Some(object);
    }
    object
        .get("data")
        .and_then(Value::as_object)
        .filter(|data| data.contains_key("items"))
}
