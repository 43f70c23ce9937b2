//! Relation lists derived from chain and theme membership
//!
//! Nothing here introduces new information: every entry restates a
//! co-membership already present in the analysis. Temporal direction uses
//! the same (timestamp, input position) order as breakthrough detection.

use super::index::AnalysisIndex;
use crate::analysis::BreakthroughType;
use crate::document::{DocumentId, Predicates};

pub fn derive_predicates(index: &AnalysisIndex<'_>, doc: usize) -> Predicates {
    let documents = index.documents;
    let analysis = index.analysis;
    let order_key = |i: usize| (documents[i].timestamp, i);
    let own = order_key(doc);

    let mut partners: Vec<usize> = Vec::new();
    for &c in index.chains_of(doc) {
        for &i in analysis.chains[c].member_indices() {
            if i != doc && !partners.contains(&i) {
                partners.push(i);
            }
        }
    }

    let select = |keep: &dyn Fn(usize) -> bool| -> Vec<DocumentId> {
        partners
            .iter()
            .copied()
            .filter(|&i| keep(i))
            .map(|i| documents[i].id.clone())
            .collect()
    };

    let converges_with = select(&|_| true);
    let influences = select(&|i| order_key(i) > own);
    let evolves_from = select(&|i| order_key(i) < own);
    let enables_breakthrough =
        select(&|i| order_key(i) > own && index.has_breakthrough(i, BreakthroughType::ParadigmShift));

    let mut connects_themes: Vec<String> = Vec::new();
    for &t in index.cross_chain_themes_of(doc) {
        for chain_id in &analysis.themes[t].chains {
            let label = analysis
                .chains
                .iter()
                .find(|c| c.chain_id == *chain_id)
                .map(|c| c.theme.clone());
            if let Some(label) = label {
                if !connects_themes.contains(&label) {
                    connects_themes.push(label);
                }
            }
        }
    }

    Predicates {
        converges_with,
        influences,
        evolves_from,
        enables_breakthrough,
        connects_themes,
    }
}
