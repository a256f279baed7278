use anyhow::{Context, Result};

use crate::sdb::{
    AttributeMultimap, AttributeValue, Client, DeleteTarget, Item, QueryOptions, ReplaceMode,
};

/// Parse a `name=value` argument
pub fn parse_attribute(arg: &str) -> Result<(String, String)> {
    let (name, value) = arg
        .split_once('=')
        .with_context(|| format!("Expected name=value, got '{}'", arg))?;

    if name.is_empty() {
        anyhow::bail!("Attribute name is empty in '{}'", arg);
    }

    Ok((name.to_string(), value.to_string()))
}

/// Type a command-line value: plain integers and decimals become numbers
/// so they are stored padded, anything else is text.
pub fn infer_value(value: &str) -> AttributeValue {
    let numeric = !value.is_empty()
        && value.chars().all(|c| c.is_ascii_digit() || c == '.')
        && value.chars().filter(|c| *c == '.').count() <= 1
        && value.chars().any(|c| c.is_ascii_digit());

    if numeric {
        if let Ok(n) = value.parse::<i64>() {
            return AttributeValue::Integer(n);
        }
        if let Ok(x) = value.parse::<f64>() {
            return AttributeValue::Float(x);
        }
    }
    AttributeValue::Text(value.to_string())
}

/// Build a multimap from `name=value` arguments, in argument order
pub fn attributes_from_args(args: &[String]) -> Result<AttributeMultimap> {
    let mut attributes = AttributeMultimap::new();
    for arg in args {
        let (name, value) = parse_attribute(arg)?;
        attributes.insert(name, infer_value(&value));
    }
    Ok(attributes)
}

fn print_item(item: &Item) {
    println!("{}", item.key());
    for (name, value) in item.iter() {
        println!("  {} = {}", name, value);
    }
}

/// List domains
pub async fn cmd_domains(client: &Client) -> Result<()> {
    let domains = client.domains().await.context("Failed to list domains")?;
    for domain in &domains {
        println!("{}", domain.name());
    }
    Ok(())
}

/// Create domain
pub async fn cmd_create_domain(client: &Client, name: &str) -> Result<()> {
    client
        .create_domain(name)
        .await
        .with_context(|| format!("Failed to create domain {}", name))?;
    println!("Domain created: {}", name);
    Ok(())
}

/// Delete domain
pub async fn cmd_delete_domain(client: &Client, name: &str) -> Result<()> {
    client
        .delete_domain(name)
        .await
        .with_context(|| format!("Failed to delete domain {}", name))?;
    println!("Domain deleted: {}", name);
    Ok(())
}

/// Show an item's attributes
pub async fn cmd_get(client: &Client, domain: &str, key: &str, names: &[String]) -> Result<()> {
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let item = client
        .domain(domain)
        .get_attributes(key, &names)
        .await
        .with_context(|| format!("Failed to get {} from {}", key, domain))?;
    print_item(&item);
    Ok(())
}

/// Store attributes
pub async fn cmd_put(
    client: &Client,
    domain: &str,
    key: &str,
    attributes: &[String],
    replace: bool,
) -> Result<()> {
    let attributes = attributes_from_args(attributes)?;
    let mode = if replace {
        ReplaceMode::All
    } else {
        ReplaceMode::None
    };

    client
        .domain(domain)
        .put_attributes(key, &attributes, &mode)
        .await
        .with_context(|| format!("Failed to put {} into {}", key, domain))?;
    println!("Stored {} attribute(s) on {}", attributes.len(), key);
    Ok(())
}

/// Delete an item, or the named attributes of it
pub async fn cmd_delete(client: &Client, domain: &str, key: &str, names: &[String]) -> Result<()> {
    let target = if names.is_empty() {
        DeleteTarget::Item
    } else {
        DeleteTarget::names(names.iter().cloned())
    };

    client
        .domain(domain)
        .delete_attributes(key, &target)
        .await
        .with_context(|| format!("Failed to delete {} from {}", key, domain))?;
    println!("Deleted: {}", key);
    Ok(())
}

/// Query a domain
pub async fn cmd_query(
    client: &Client,
    domain: &str,
    expression: Option<&str>,
    max_results: Option<u32>,
    all: bool,
    load: bool,
) -> Result<()> {
    let mut options = QueryOptions::new().load_attributes(load);
    if let Some(expression) = expression {
        options = options.expression(expression);
    }
    if let Some(max) = max_results {
        options = options.max_results(max);
    }

    let domain = client.domain(domain);
    let (items, next_token) = if all {
        (domain.query_all(&options).await?, None)
    } else {
        let page = domain.query(&options).await?;
        let token = page.next_token().map(str::to_string);
        (page.into_items(), token)
    };

    for item in &items {
        if load {
            print_item(item);
        } else {
            println!("{}", item.key());
        }
    }

    if let Some(token) = next_token {
        println!("(more results, next token: {})", token);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute("color=blue").unwrap(),
            ("color".to_string(), "blue".to_string())
        );
        assert_eq!(
            parse_attribute("expr=a=b").unwrap(),
            ("expr".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_attribute("empty=").unwrap(),
            ("empty".to_string(), String::new())
        );
        assert!(parse_attribute("novalue").is_err());
        assert!(parse_attribute("=x").is_err());
    }

    #[test]
    fn test_infer_value() {
        assert_eq!(infer_value("42"), AttributeValue::Integer(42));
        assert_eq!(infer_value("3.5"), AttributeValue::Float(3.5));
        assert_eq!(infer_value("-7"), AttributeValue::Text("-7".to_string()));
        assert_eq!(infer_value("1.2.3"), AttributeValue::Text("1.2.3".to_string()));
        assert_eq!(infer_value("."), AttributeValue::Text(".".to_string()));
        assert_eq!(infer_value("inf"), AttributeValue::Text("inf".to_string()));
    }

    #[test]
    fn test_attributes_from_args_keeps_order() {
        let args = vec![
            "b=1".to_string(),
            "a=x".to_string(),
            "b=2".to_string(),
        ];
        let attributes = attributes_from_args(&args).unwrap();
        assert_eq!(attributes.len(), 3);
        assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(
            attributes.get_all("b"),
            vec![&AttributeValue::Integer(1), &AttributeValue::Integer(2)]
        );
    }
}
