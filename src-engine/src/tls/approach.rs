use std::collections::{BTreeMap, HashMap};

/// Correspondance position de signal -> approche contrôlée, pour un carrefour.
/// Une position sans approche reste au rouge dans tous les états.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApproachIndexMap {
    positions: Vec<Option<String>>,
}

impl ApproachIndexMap {
    /// Construit la carte depuis la liste ordonnée des positions.
    pub fn from_positions<I, S>(positions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            positions: positions.into_iter().map(|p| Some(p.into())).collect(),
        }
    }

    /// Construit la carte depuis un index explicite ; les trous deviennent des positions libres.
    pub fn from_index(index: &BTreeMap<usize, String>) -> Self {
        let width = index.keys().next_back().map(|&max| max + 1).unwrap_or(0);
        let mut positions = vec![None; width];
        for (&idx, approach) in index {
            positions[idx] = Some(approach.clone());
        }
        Self { positions }
    }

    /// Nombre de positions de signal (largeur des chaînes d'état).
    pub fn width(&self) -> usize {
        self.positions.len()
    }

    pub fn approach_at(&self, position: usize) -> Option<&str> {
        self.positions.get(position).and_then(|p| p.as_deref())
    }

    pub fn controls(&self, approach: &str) -> bool {
        self.positions.iter().any(|p| p.as_deref() == Some(approach))
    }
}

/// Collaborateur externe : fournit la carte des positions d'un carrefour
/// (issue de l'inspection de la topologie du réseau).
pub trait ApproachIndexProvider: Send + Sync {
    fn approach_map(&self, tls_id: &str) -> Option<ApproachIndexMap>;
}

/// Fournisseur statique, alimenté par le fichier de scénario.
#[derive(Debug, Clone, Default)]
pub struct StaticApproachIndex {
    maps: HashMap<String, ApproachIndexMap>,
}

impl StaticApproachIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tls_id: impl Into<String>, map: ApproachIndexMap) {
        self.maps.insert(tls_id.into(), map);
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

impl ApproachIndexProvider for StaticApproachIndex {
    fn approach_map(&self, tls_id: &str) -> Option<ApproachIndexMap> {
        self.maps.get(tls_id).cloned()
    }
}
