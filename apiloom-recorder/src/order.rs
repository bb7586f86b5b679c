//! Dependency ordering of a cassette's endpoints

use apiloom::Endpoint;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Done,
}

/// Order endpoints so each one follows the endpoint it depends on
///
/// Depth-first in input order. A dependency outside `endpoints` is ignored.
/// A cycle is logged and broken at the node already on the stack, so every
/// endpoint still appears exactly once.
pub fn order_by_dependency<'e, C>(endpoints: &[&'e Endpoint<C>]) -> Vec<&'e Endpoint<C>> {
    let index: HashMap<&str, usize> = endpoints
        .iter()
        .enumerate()
        .map(|(i, endpoint)| (endpoint.name.as_str(), i))
        .collect();

    let mut walk = Walk {
        endpoints,
        index,
        marks: vec![Mark::Unvisited; endpoints.len()],
        ordered: Vec::with_capacity(endpoints.len()),
    };
    for i in 0..endpoints.len() {
        walk.visit(i);
    }
    walk.ordered
}

struct Walk<'s, 'e, C> {
    endpoints: &'s [&'e Endpoint<C>],
    index: HashMap<&'s str, usize>,
    marks: Vec<Mark>,
    ordered: Vec<&'e Endpoint<C>>,
}

impl<C> Walk<'_, '_, C> {
    fn visit(&mut self, i: usize) {
        match self.marks[i] {
            Mark::Done => return,
            Mark::Visiting => {
                warn!(
                    "Dependency cycle through endpoint {}; recording it without its upstream",
                    self.endpoints[i].name
                );
                return;
            }
            Mark::Unvisited => {}
        }

        self.marks[i] = Mark::Visiting;
        let endpoint = self.endpoints[i];
        if let Some(upstream) = endpoint.depends_on.as_deref() {
            match self.index.get(upstream).copied() {
                Some(j) => self.visit(j),
                None => debug!(
                    "{} depends on {}, which is not in this cassette",
                    endpoint.name, upstream
                ),
            }
        }
        self.marks[i] = Mark::Done;
        self.ordered.push(endpoint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Client;

    fn endpoint(name: &str, upstream: Option<&str>) -> Endpoint<Client> {
        let builder = Endpoint::builder(name).cassette("gym");
        match upstream {
            Some(upstream) => builder.depends_on(upstream, |_| None).build(),
            None => builder.build(),
        }
    }

    fn names(ordered: &[&Endpoint<Client>]) -> Vec<String> {
        ordered.iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_chain_is_ordered_upstream_first() {
        let c = endpoint("c", Some("b"));
        let a = endpoint("a", None);
        let b = endpoint("b", Some("a"));

        let ordered = order_by_dependency(&[&c, &a, &b]);
        assert_eq!(names(&ordered), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_independent_endpoints_keep_input_order() {
        let x = endpoint("x", None);
        let y = endpoint("y", None);
        let z = endpoint("z", None);

        let ordered = order_by_dependency(&[&z, &x, &y]);
        assert_eq!(names(&ordered), vec!["z", "x", "y"]);
    }

    #[test]
    fn test_outside_dependency_is_ignored() {
        let a = endpoint("a", Some("elsewhere"));
        let b = endpoint("b", None);

        let ordered = order_by_dependency(&[&a, &b]);
        assert_eq!(names(&ordered), vec!["a", "b"]);
    }

    #[test]
    fn test_cycle_emits_each_endpoint_once() {
        let a = endpoint("a", Some("b"));
        let b = endpoint("b", Some("a"));

        let ordered = order_by_dependency(&[&a, &b]);
        assert_eq!(names(&ordered), vec!["b", "a"]);
    }
}
