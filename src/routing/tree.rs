//! Route tree construction and resolution.
//!
//! # Responsibilities
//! - Build an immutable tree of compiled routes from nested configuration
//! - Resolve a pathname into the root → leaf chain of matches
//!
//! # Design Decisions
//! - Each node stores only its own level's pattern, relative to its parent
//! - Absolute child paths must extend the combined path of their parents
//! - First sibling that leads to a full match wins; no specificity scoring
//! - A node whose children all fail is still a leaf if it consumed the path

use std::sync::Arc;

use serde::Serialize;

use crate::config::RouteConfig;
use crate::routing::pattern::split_path;
use crate::routing::{CompiledRoute, Params, RouteError};

/// One node of the route tree.
#[derive(Debug, Serialize)]
pub struct RouteNode {
    /// Combined pattern from the root, e.g. `/users/:id`.
    path: String,
    element: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    prerender: bool,
    #[serde(skip)]
    route: CompiledRoute,
    #[serde(skip)]
    children: Vec<Arc<RouteNode>>,
}

impl RouteNode {
    /// Combined pattern of this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Opaque target rendered by the binding layer.
    pub fn element(&self) -> &str {
        &self.element
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Whether this node's target waits for a readiness signal.
    pub fn prerender(&self) -> bool {
        self.prerender
    }

    /// This level's compiled pattern, relative to the parent.
    pub fn route(&self) -> &CompiledRoute {
        &self.route
    }

    pub fn children(&self) -> &[Arc<RouteNode>] {
        &self.children
    }

    fn build(config: &RouteConfig, parent: Option<&str>) -> Result<Arc<Self>, RouteError> {
        let (own, path) = combine_paths(parent, &config.path)?;
        let route = CompiledRoute::compile(&own)?;

        let children = config
            .children
            .iter()
            .map(|child| Self::build(child, Some(&path)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Arc::new(Self {
            path,
            element: config.element.clone(),
            title: config.title.clone(),
            prerender: config.prerender,
            route,
            children,
        }))
    }
}

/// Split a configured path into (own pattern, combined pattern).
///
/// Relative paths are appended to the parent; absolute child paths must start
/// with the parent's combined path, which is then stripped off.
pub(crate) fn combine_paths(
    parent: Option<&str>,
    path: &str,
) -> Result<(String, String), RouteError> {
    let Some(parent) = parent else {
        let full = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        return Ok((full.clone(), full));
    };

    let base = parent.trim_end_matches('/');

    if !path.starts_with('/') {
        return Ok((path.to_string(), format!("{base}/{path}")));
    }

    if base.is_empty() {
        return Ok((path[1..].to_string(), path.to_string()));
    }

    let own = match path.strip_prefix(base) {
        Some("") => "",
        Some(rest) => match rest.strip_prefix('/') {
            Some(rest) => rest,
            None => {
                return Err(RouteError::NestedPathMismatch {
                    child: path.to_string(),
                    parent: parent.to_string(),
                })
            }
        },
        None => {
            return Err(RouteError::NestedPathMismatch {
                child: path.to_string(),
                parent: parent.to_string(),
            })
        }
    };

    Ok((own.to_string(), path.to_string()))
}

/// Result of matching one tree level.
#[derive(Debug, Clone, Serialize)]
pub struct RouteMatch {
    /// Portion of the path matched up to and including this level.
    pub pathname: String,
    /// Bindings made by this level only.
    pub params: Params,
    /// The matched node.
    pub node: Arc<RouteNode>,
}

impl RouteMatch {
    /// True when both matches select the same node with the same bindings.
    pub fn same_target(&self, other: &RouteMatch) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
            && self.pathname == other.pathname
            && self.params == other.params
    }
}

/// Fold a match chain into one map; deeper levels win on collision.
pub fn merge_params(matches: &[RouteMatch]) -> Params {
    matches.iter().fold(Params::new(), |mut acc, m| {
        acc.extend(m.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        acc
    })
}

/// Immutable tree of compiled routes.
#[derive(Debug, Default)]
pub struct RouteTree {
    roots: Vec<Arc<RouteNode>>,
}

impl RouteTree {
    /// Compile a nested route configuration. Fails on the first bad pattern.
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, RouteError> {
        let roots = routes
            .iter()
            .map(|route| RouteNode::build(route, None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[Arc<RouteNode>] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Resolve a pathname. Returns the full root → leaf chain, or an empty
    /// vector when nothing matches.
    pub fn resolve(&self, pathname: &str) -> Vec<RouteMatch> {
        let Some(segments) = split_path(pathname) else {
            return Vec::new();
        };

        self.roots
            .iter()
            .find_map(|root| resolve_node(root, &segments, 0))
            .unwrap_or_default()
    }
}

fn resolve_node(
    node: &Arc<RouteNode>,
    segments: &[&str],
    offset: usize,
) -> Option<Vec<RouteMatch>> {
    let (params, consumed) = node.route.match_prefix(&segments[offset..])?;
    let end = offset + consumed;

    let matched = RouteMatch {
        pathname: format!("/{}", segments[..end].join("/")),
        params,
        node: Arc::clone(node),
    };

    for child in &node.children {
        if let Some(mut chain) = resolve_node(child, segments, end) {
            chain.insert(0, matched);
            return Some(chain);
        }
    }

    (end == segments.len()).then(|| vec![matched])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> RouteTree {
        let routes = vec![
            RouteConfig::new("/", "Home").child(RouteConfig::new("/about", "About")),
            RouteConfig::new("/users", "Users").child(RouteConfig::new("/users/:id", "User")),
        ];
        RouteTree::from_config(&routes).unwrap()
    }

    fn paths(chain: &[RouteMatch]) -> Vec<&str> {
        chain.iter().map(|m| m.node.path()).collect()
    }

    #[test]
    fn test_root_chain() {
        let chain = sample_tree().resolve("/");
        assert_eq!(paths(&chain), ["/"]);
        assert_eq!(chain[0].pathname, "/");
    }

    #[test]
    fn test_nested_chain() {
        let tree = sample_tree();

        let chain = tree.resolve("/about");
        assert_eq!(paths(&chain), ["/", "/about"]);

        let chain = tree.resolve("/users/123");
        assert_eq!(chain.len(), 2);
        assert_eq!(paths(&chain), ["/users", "/users/:id"]);
        assert_eq!(chain[1].params.get("id").map(String::as_str), Some("123"));
        assert!(chain[0].params.is_empty());
        assert_eq!(chain[1].pathname, "/users/123");
    }

    #[test]
    fn test_three_level_chain() {
        let routes = vec![RouteConfig::new("/", "Root")
            .child(RouteConfig::new("/about", "About"))
            .child(RouteConfig::new("/users", "Users").child(RouteConfig::new(":id", "User")))];
        let tree = RouteTree::from_config(&routes).unwrap();

        let chain = tree.resolve("/users/123");
        assert_eq!(paths(&chain), ["/", "/users", "/users/:id"]);
        assert_eq!(
            chain.last().unwrap().params.get("id").map(String::as_str),
            Some("123")
        );
    }

    #[test]
    fn test_no_match_is_empty() {
        let tree = sample_tree();
        assert!(tree.resolve("/missing").is_empty());
        assert!(tree.resolve("/users/1/2").is_empty());
        assert!(tree.resolve("relative").is_empty());
    }

    #[test]
    fn test_parent_is_leaf_when_path_consumed() {
        let chain = sample_tree().resolve("/users");
        assert_eq!(paths(&chain), ["/users"]);
    }

    #[test]
    fn test_backtracks_to_next_sibling() {
        let routes = vec![
            RouteConfig::new("/a", "A").child(RouteConfig::new("x", "AX")),
            RouteConfig::new("/a/:b", "AB"),
        ];
        let tree = RouteTree::from_config(&routes).unwrap();

        let chain = tree.resolve("/a/y");
        assert_eq!(paths(&chain), ["/a/:b"]);
    }

    #[test]
    fn test_first_match_not_best_match() {
        let routes = vec![
            RouteConfig::new("/items/:id", "Item"),
            RouteConfig::new("/items/new", "NewItem"),
        ];
        let tree = RouteTree::from_config(&routes).unwrap();
        let chain = tree.resolve("/items/new");
        assert_eq!(chain[0].node.element(), "Item");
    }

    #[test]
    fn test_descendant_params_win() {
        let routes = vec![RouteConfig::new("/org/:id", "Org")
            .child(RouteConfig::new(":id", "Team"))];
        let tree = RouteTree::from_config(&routes).unwrap();

        let chain = tree.resolve("/org/1/2");
        assert_eq!(chain[0].params.get("id").map(String::as_str), Some("1"));
        let merged = merge_params(&chain);
        assert_eq!(merged.get("id").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_combine_paths() {
        assert_eq!(
            combine_paths(None, "about").unwrap(),
            ("/about".into(), "/about".into())
        );
        assert_eq!(
            combine_paths(Some("/"), "/about").unwrap(),
            ("about".into(), "/about".into())
        );
        assert_eq!(
            combine_paths(Some("/users"), "/users/:id").unwrap(),
            (":id".into(), "/users/:id".into())
        );
        assert_eq!(
            combine_paths(Some("/users"), "/users").unwrap(),
            ("".into(), "/users".into())
        );
        assert!(combine_paths(Some("/users"), "/usersx").is_err());
        assert!(combine_paths(Some("/users"), "/posts/1").is_err());
    }

    #[test]
    fn test_duplicate_param_rejected() {
        let routes = vec![RouteConfig::new("/a/:x/:x", "A")];
        assert!(matches!(
            RouteTree::from_config(&routes),
            Err(RouteError::DuplicateParam { .. })
        ));
    }
}
