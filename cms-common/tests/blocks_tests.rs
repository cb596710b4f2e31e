//! Web-page block wire format
//!
//! Rebuilding the tree from the flat form must give back exactly the blocks
//! that were written, including accordion children and their order.

use cms_common::blocks::{flatten, nest, ContentBlock};
use cms_common::entities::{Article, ArticleContent, Entity};

fn rich(body: &str) -> ContentBlock {
    ContentBlock::RichText { body: body.to_string() }
}

fn page(n: usize, m: usize) -> Vec<ContentBlock> {
    let mut blocks: Vec<ContentBlock> = (0..n).map(|i| rich(&format!("para {}", i))).collect();
    let children = (0..m).map(|j| rich(&format!("item {}", j))).collect();
    blocks.insert(
        n / 2,
        ContentBlock::AccordionGroup {
            title: "Questions".to_string(),
            children,
        },
    );
    blocks.push(ContentBlock::Divider);
    blocks
}

#[test]
fn test_nest_inverts_flatten() {
    for (n, m) in [(0, 1), (3, 2), (5, 4)] {
        let blocks = page(n, m);
        let flat = flatten(&blocks);
        assert_eq!(flat.len(), blocks.len() + m);
        assert_eq!(nest(flat).unwrap(), blocks);
    }
}

#[test]
fn test_wire_json_survives_serialization() {
    let blocks = page(2, 3);
    let json = serde_json::to_value(flatten(&blocks)).unwrap();
    let parsed = serde_json::from_value(json).unwrap();
    assert_eq!(nest(parsed).unwrap(), blocks);
}

#[test]
fn test_article_wire_is_flat() {
    let mut article = Article::new(
        "Sleep hygiene",
        ArticleContent::WebPage { blocks: page(1, 2) },
    );
    article.summary = "Better nights".to_string();

    let wire = article.to_wire().unwrap();
    let wire_blocks = wire["blocks"].as_array().expect("blocks array");
    assert_eq!(wire_blocks.len(), 5);
    // the group sits first, followed by its two children
    assert!(wire_blocks[0]["group_id"].is_string());
    assert_eq!(wire_blocks[1]["accordion_group_id"], wire_blocks[0]["group_id"]);
    assert_eq!(wire_blocks[2]["accordion_group_id"], wire_blocks[0]["group_id"]);

    let back = Article::from_wire(wire).unwrap();
    assert_eq!(back, article);
}
