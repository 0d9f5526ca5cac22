//! Schema evaluation engine
//!
//! Walks an XML element tree in lock-step with a parse table and assembles a
//! native value tree. Each schema kind has one handler; `evaluate` dispatches
//! on the kind and the composite/list/alternatives handlers recurse through
//! it for their child tables, so the whole engine is a single mutually
//! recursive evaluator.
//!
//! On success every tagged schema yields a one-entry object keyed by its tag;
//! an alternatives schema yields whichever candidate matched, unwrapped.
//! Failure never returns a partially built value: a rejected candidate's
//! intermediate state is dropped wholesale.

use roxmltree::Node;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Attempt, Error, ErrorKind, Result};
use crate::schema::Schema;
use crate::value::{Array, Object, Value};

/// Evaluate a schema node against an XML element.
pub fn evaluate(node: Node<'_, '_>, schema: &Schema) -> Result<Value> {
    match schema {
        Schema::Text { tag } => eval_text(node, tag),
        Schema::Attribute { tag } => eval_attribute(node, tag),
        Schema::AttributeText { tag, text_key } => eval_attribute_text(node, tag, text_key),
        Schema::Composite {
            tag,
            required,
            optional,
        } => eval_composite(node, tag, required, optional),
        Schema::List {
            tag,
            element,
            skip_count,
        } => eval_list(node, tag, element, *skip_count),
        Schema::Alternatives { candidates } => eval_alternatives(node, candidates),
    }
}

fn eval_text(node: Node<'_, '_>, tag: &str) -> Result<Value> {
    expect_tag(node, tag)?;
    Ok(singleton(tag, text_content(node)))
}

fn eval_attribute(node: Node<'_, '_>, tag: &str) -> Result<Value> {
    expect_tag(node, tag)?;
    Ok(singleton(tag, Value::Object(attributes_of(node))))
}

fn eval_attribute_text(node: Node<'_, '_>, tag: &str, text_key: &str) -> Result<Value> {
    expect_tag(node, tag)?;
    let mut inner = attributes_of(node);
    inner.insert(text_key, text_content(node));
    Ok(singleton(tag, Value::Object(inner)))
}

fn eval_composite(
    node: Node<'_, '_>,
    tag: &str,
    required: &[Arc<Schema>],
    optional: &[Arc<Schema>],
) -> Result<Value> {
    expect_tag(node, tag)?;

    let mut merged = Object::new();
    for child_schema in required {
        let child = find_child(node, child_schema).ok_or_else(|| {
            Error::new(ErrorKind::MissingRequiredChild {
                child: child_schema.tag_names(),
                parent: tag.to_string(),
            })
        })?;
        let entry = evaluate(child, child_schema).map_err(|err| err.within(tag))?;
        merge_entry(&mut merged, entry);
    }
    for child_schema in optional {
        if let Some(child) = find_child(node, child_schema) {
            let entry = evaluate(child, child_schema).map_err(|err| err.within(tag))?;
            merge_entry(&mut merged, entry);
        }
    }

    Ok(singleton(tag, Value::Object(merged)))
}

fn eval_list(
    node: Node<'_, '_>,
    tag: &str,
    element_schema: &Arc<Schema>,
    skip_count: bool,
) -> Result<Value> {
    expect_tag(node, tag)?;

    let mut items = Array::new();
    for child in element_children(node) {
        if element_schema.matches_tag(child.tag_name().name()) {
            let item = evaluate(child, element_schema).map_err(|err| err.within(tag))?;
            items.push(item);
        }
    }

    if skip_count {
        return Ok(singleton(tag, Value::Array(items)));
    }

    let declared = read_count(node, tag)?;
    let actual = items.len() as u64;
    if declared != actual {
        return Err(Error::new(ErrorKind::CountMismatch {
            tag: tag.to_string(),
            declared,
            actual,
        }));
    }

    let mut counted = Object::new();
    counted.insert("count", declared);
    counted.insert("items", Value::Array(items));
    Ok(singleton(tag, Value::Object(counted)))
}

fn eval_alternatives(node: Node<'_, '_>, candidates: &[Arc<Schema>]) -> Result<Value> {
    let mut attempts = Vec::new();
    for (index, candidate) in candidates.iter().enumerate() {
        match evaluate(node, candidate) {
            Ok(value) => {
                debug!(candidate = index, tag = %candidate.tag_names(), "candidate matched");
                return Ok(value);
            }
            Err(error) if error.is_recoverable() => {
                debug!(candidate = index, %error, "candidate rejected");
                attempts.push(Attempt {
                    candidate: index,
                    error,
                });
            }
            // Count and attribute corruption must not masquerade as a
            // shape mismatch
            Err(error) => return Err(error),
        }
    }
    Err(Error::new(ErrorKind::NoAlternativeMatched { attempts }))
}

fn expect_tag(node: Node<'_, '_>, tag: &str) -> Result<()> {
    let found = node.tag_name().name();
    if found == tag {
        Ok(())
    } else {
        Err(Error::new(ErrorKind::TagMismatch {
            expected: tag.to_string(),
            found: found.to_string(),
        }))
    }
}

fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

/// First immediate child that is a lookup match for the schema, in document
/// order. Composites describe a set of shape-distinct children; repetition
/// is the list construct's job.
fn find_child<'a, 'input>(node: Node<'a, 'input>, schema: &Schema) -> Option<Node<'a, 'input>> {
    element_children(node).find(|child| schema.matches_tag(child.tag_name().name()))
}

fn text_content(node: Node<'_, '_>) -> Value {
    match node.text().map(str::trim) {
        Some(text) if !text.is_empty() => Value::String(text.to_string()),
        _ => Value::Null,
    }
}

fn attributes_of(node: Node<'_, '_>) -> Object {
    let mut attrs = Object::new();
    for attribute in node.attributes() {
        attrs.insert(attribute.name(), attribute.value());
    }
    attrs
}

fn singleton(tag: &str, inner: Value) -> Value {
    let mut object = Object::new();
    object.insert(tag, inner);
    Value::Object(object)
}

/// Merge a child's one-entry result into the composite's accumulator.
/// First insertion wins, which makes required entries shadow optional ones
/// declaring the same tag.
fn merge_entry(target: &mut Object, entry: Value) {
    if let Value::Object(object) = entry {
        for (key, value) in object {
            if !target.contains_key(&key) {
                target.insert(key, value);
            }
        }
    }
}

fn read_count(node: Node<'_, '_>, tag: &str) -> Result<u64> {
    let raw = node.attribute("count").ok_or_else(|| {
        Error::new(ErrorKind::MalformedAttribute {
            tag: tag.to_string(),
            attribute: "count".to_string(),
            value: None,
        })
    })?;
    raw.parse().map_err(|_| {
        Error::new(ErrorKind::MalformedAttribute {
            tag: tag.to_string(),
            attribute: "count".to_string(),
            value: Some(raw.to_string()),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(xml: &str, schema: &Schema) -> Result<Value> {
        let doc = roxmltree::Document::parse(xml).expect("test document");
        evaluate(doc.root_element(), schema)
    }

    #[test]
    fn test_text_tag() {
        let schema = Schema::text("user");
        let value = eval("<user>alice</user>", &schema).expect("match");
        assert_eq!(value.get("user"), Some(&Value::String("alice".to_string())));
    }

    #[test]
    fn test_text_tag_empty_is_null() {
        let schema = Schema::text("description");
        let value = eval("<description/>", &schema).expect("match");
        assert_eq!(value.get("description"), Some(&Value::Null));
    }

    #[test]
    fn test_text_tag_mismatch() {
        let schema = Schema::text("user");
        let err = eval("<login>alice</login>", &schema).expect_err("mismatch");
        assert!(matches!(err.kind(), ErrorKind::TagMismatch { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_attribute_tag_captures_all_attributes() {
        let schema = Schema::attribute("node");
        let value = eval(r#"<node name="web1" status="up"/>"#, &schema).expect("match");
        let inner = value.get("node").and_then(Value::as_object).expect("object");
        assert_eq!(inner.get("name"), Some(&Value::String("web1".to_string())));
        assert_eq!(inner.get("status"), Some(&Value::String("up".to_string())));
    }

    #[test]
    fn test_attribute_tag_no_attributes_is_empty_object() {
        let schema = Schema::attribute("node");
        let value = eval("<node/>", &schema).expect("match");
        let inner = value.get("node").and_then(Value::as_object).expect("object");
        assert!(inner.is_empty());
    }

    #[test]
    fn test_attribute_text_merges_text_under_key() {
        let schema = Schema::attribute_text("date-started", "time");
        let value = eval(
            r#"<date-started unixtime="100">2015-01-01</date-started>"#,
            &schema,
        )
        .expect("match");
        let inner = value
            .get("date-started")
            .and_then(Value::as_object)
            .expect("object");
        assert_eq!(inner.get("unixtime"), Some(&Value::String("100".to_string())));
        assert_eq!(
            inner.get("time"),
            Some(&Value::String("2015-01-01".to_string()))
        );
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn test_composite_missing_required_child() {
        let schema = Schema::composite("job", [Schema::text("id"), Schema::text("name")], []);
        let err = eval("<job><id>1</id></job>", &schema).expect_err("missing name");
        assert!(matches!(
            err.kind(),
            ErrorKind::MissingRequiredChild { child, parent }
                if child == "name" && parent == "job"
        ));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_counted_list_roundtrip() {
        let schema = Schema::list("jobs", Schema::composite("job", [Schema::text("id")], []));
        let value = eval(
            r#"<jobs count="2"><job><id>1</id></job><job><id>2</id></job></jobs>"#,
            &schema,
        )
        .expect("match");
        let jobs = value.get("jobs").and_then(Value::as_object).expect("object");
        assert_eq!(jobs.get("count"), Some(&Value::Number(2)));
        assert_eq!(
            jobs.get("items").and_then(Value::as_array).map(Array::len),
            Some(2)
        );
    }

    #[test]
    fn test_list_count_attribute_missing_is_fatal() {
        let schema = Schema::list("jobs", Schema::text("job"));
        let err = eval("<jobs><job>a</job></jobs>", &schema).expect_err("no count");
        assert!(matches!(
            err.kind(),
            ErrorKind::MalformedAttribute { value: None, .. }
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_list_count_attribute_unparseable_is_fatal() {
        let schema = Schema::list("jobs", Schema::text("job"));
        let err = eval(r#"<jobs count="many"><job>a</job></jobs>"#, &schema).expect_err("bad count");
        assert!(matches!(
            err.kind(),
            ErrorKind::MalformedAttribute { value: Some(v), .. } if v == "many"
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_alternatives_first_match_wins() {
        let schema = Schema::alternatives([
            Schema::composite("result", [Schema::text("message")], []),
            // also matches the same input; must never be chosen
            Schema::composite("result", [], [Schema::text("message")]),
        ]);
        let value = eval("<result><message>ok</message></result>", &schema).expect("match");
        assert_eq!(
            value.get("result").and_then(|r| r.get("message")),
            Some(&Value::String("ok".to_string()))
        );
    }

    #[test]
    fn test_alternatives_exhaustion_keeps_attempts() {
        let schema = Schema::alternatives([
            Schema::composite("result", [Schema::text("message")], []),
            Schema::composite("result", [Schema::text("error")], []),
        ]);
        let err = eval("<result><other/></result>", &schema).expect_err("exhausted");
        let attempts = err.attempts().expect("attempt list");
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].candidate, 0);
        assert_eq!(attempts[1].candidate, 1);
    }

    #[test]
    fn test_required_shadows_optional_same_tag() {
        // schema-authoring error, but required must win
        let schema = Schema::composite(
            "job",
            [Schema::text("id")],
            [Schema::attribute("id")],
        );
        let value = eval("<job><id>42</id></job>", &schema).expect("match");
        assert_eq!(
            value.get("job").and_then(|j| j.get("id")),
            Some(&Value::String("42".to_string()))
        );
    }
}
