use anyhow::{Result, anyhow, ensure};

/// 再計算の結果。更新抑制は正常な終端結果であり、エラーではない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recompute<T> {
    Render(T),
    Suppress,
}

impl<T> Recompute<T> {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Recompute::Suppress)
    }

    pub fn rendered(self) -> Option<T> {
        match self {
            Recompute::Render(value) => Some(value),
            Recompute::Suppress => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Recompute<U> {
        match self {
            Recompute::Render(value) => Recompute::Render(f(value)),
            Recompute::Suppress => Recompute::Suppress,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
struct Node {
    name: &'static str,
    inputs: Vec<NodeId>,
}

/// 入力と出力を明示的な依存グラフとして宣言する。
///
/// 各出力は自分の入力ノード集合を登録時に宣言し、`affected` が
/// 変更入力の下流にある出力だけをトポロジカル順で返す。依存先は
/// 登録済みノードに限られるため循環は構成できず、前方参照は
/// エラーとして弾かれる。
#[derive(Debug, Default)]
pub struct ReactiveGraph {
    nodes: Vec<Node>,
}

impl ReactiveGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_input(&mut self, name: &'static str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            inputs: Vec::new(),
        });
        id
    }

    pub fn add_output(&mut self, name: &'static str, inputs: &[NodeId]) -> Result<NodeId> {
        ensure!(
            !inputs.is_empty(),
            "出力 {name} は少なくとも1つの入力を宣言する必要があります"
        );
        let id = NodeId(self.nodes.len());
        for input in inputs {
            // 登録済みノードしか参照できないため、依存は常に後方向き。
            ensure!(
                input.0 < id.0,
                "出力 {name} が未登録のノードに依存しています"
            );
        }
        self.nodes.push(Node {
            name,
            inputs: inputs.to_vec(),
        });
        Ok(id)
    }

    pub fn name(&self, id: NodeId) -> Result<&'static str> {
        self.nodes
            .get(id.0)
            .map(|node| node.name)
            .ok_or_else(|| anyhow!("未知のノードIDです: {}", id.0))
    }

    /// 変更された入力の下流にある出力ノードをトポロジカル順で返す。
    /// ノードIDは依存より必ず後に振られるため、ID昇順が評価順になる。
    pub fn affected(&self, changed: &[NodeId]) -> Vec<NodeId> {
        let mut dirty = vec![false; self.nodes.len()];
        for id in changed {
            if id.0 < dirty.len() {
                dirty[id.0] = true;
            }
        }

        let mut order = Vec::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            if node.inputs.is_empty() {
                continue;
            }
            if node.inputs.iter().any(|input| dirty[input.0]) {
                dirty[idx] = true;
                order.push(NodeId(idx));
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> (ReactiveGraph, [NodeId; 3], [NodeId; 3]) {
        let mut graph = ReactiveGraph::new();
        let mode = graph.add_input("mode");
        let top = graph.add_input("top");
        let click = graph.add_input("click");
        let options = graph.add_output("options", &[mode, top]).unwrap();
        let trend = graph.add_output("trend", &[mode, top, options]).unwrap();
        let pyramid = graph
            .add_output("pyramid", &[mode, top, options, click])
            .unwrap();
        (graph, [mode, top, click], [options, trend, pyramid])
    }

    #[test]
    fn affected_returns_downstream_outputs_in_topological_order() {
        let (graph, [_, top, _], [options, trend, pyramid]) = sample_graph();
        assert_eq!(graph.affected(&[top]), vec![options, trend, pyramid]);
    }

    #[test]
    fn unrelated_inputs_do_not_mark_outputs() {
        let (graph, [_, _, click], [_, _, pyramid]) = sample_graph();
        assert_eq!(graph.affected(&[click]), vec![pyramid]);
    }

    #[test]
    fn dirtiness_propagates_through_intermediate_outputs() {
        let mut graph = ReactiveGraph::new();
        let input = graph.add_input("input");
        let middle = graph.add_output("middle", &[input]).unwrap();
        let leaf = graph.add_output("leaf", &[middle]).unwrap();
        assert_eq!(graph.affected(&[input]), vec![middle, leaf]);
    }

    #[test]
    fn forward_references_are_rejected() {
        let mut graph = ReactiveGraph::new();
        let input = graph.add_input("input");
        let future = NodeId(5);
        let err = graph
            .add_output("broken", &[input, future])
            .expect_err("前方参照は拒否されるはず");
        assert!(format!("{err}").contains("未登録のノード"));
    }

    #[test]
    fn outputs_require_at_least_one_input() {
        let mut graph = ReactiveGraph::new();
        assert!(graph.add_output("orphan", &[]).is_err());
    }

    #[test]
    fn suppress_is_a_terminal_outcome_not_an_error() {
        let result: Recompute<u32> = Recompute::Suppress;
        assert!(result.is_suppressed());
        assert_eq!(result.rendered(), None);
        let rendered = Recompute::Render(2).map(|value| value * 10);
        assert_eq!(rendered.rendered(), Some(20));
    }

    #[test]
    fn node_names_resolve() {
        let (graph, [mode, _, _], [options, _, _]) = sample_graph();
        assert_eq!(graph.name(mode).unwrap(), "mode");
        assert_eq!(graph.name(options).unwrap(), "options");
        assert!(graph.name(NodeId(99)).is_err());
    }
}
