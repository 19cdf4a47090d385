// FICHIER : src-engine/src/genetics/repair.rs

use crate::genetics::types::Genome;
use crate::tls::bounds::EPSILON;
use crate::tls::plan::dedup_preserving;
use crate::tls::{validate_compatibility, Bounds, BoundsMap, CompatibilityGroup, CompatibilityMap, DurationKind, TlsGene};
use tracing::trace;

pub const DEFAULT_GRANULARITY: f64 = 0.5;

/// Arrondit au multiple de `granularity` le plus proche (0 = pas de grille).
pub fn quantize(value: f64, granularity: f64) -> f64 {
    if granularity <= 0.0 {
        return value;
    }
    (value / granularity).round() * granularity
}

/// Ramène `value` dans `[lo, hi]`. Une valeur NaN tombe sur `lo`.
fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Projette un génome quelconque sur l'espace des plans admissibles.
///
/// Ordre fixe par carrefour : quantification, bornage des durées, compatibilité
/// des approches, correction du cycle, normalisation du décalage.
/// Seules la compatibilité et le cycle comptent comme violations ; une correction
/// de cycle impossible à absorber ajoute une violation résiduelle.
///
/// Le génome réparé est un point fixe : le réparer à nouveau ne le modifie pas.
/// Le compte de violations, lui, n'est idempotent que si le cycle a été ramené
/// dans ses bornes. Un reliquat de cycle est signalé de nouveau à chaque passe,
/// si bien que `repair(repair(x))` peut retourner un compte non nul.
#[derive(Debug, Clone, Copy)]
pub struct FeasibilityRepair {
    granularity: f64,
}

impl Default for FeasibilityRepair {
    fn default() -> Self {
        Self::new(DEFAULT_GRANULARITY)
    }
}

impl FeasibilityRepair {
    pub fn new(granularity: f64) -> Self {
        Self { granularity }
    }

    pub fn granularity(&self) -> f64 {
        self.granularity
    }

    /// Répare le génome en place et retourne le nombre de violations corrigées.
    pub fn repair_genome(&self, genome: &mut Genome, bounds: &BoundsMap, compat: &CompatibilityMap) -> u32 {
        genome
            .iter_mut()
            .map(|(tls_id, gene)| self.repair_tls(gene, bounds.for_tls(tls_id), compat.groups(tls_id)))
            .sum()
    }

    /// Variante non destructive : retourne une copie réparée et le compte de violations.
    pub fn repaired(&self, genome: &Genome, bounds: &BoundsMap, compat: &CompatibilityMap) -> (Genome, u32) {
        let mut copy = genome.clone();
        let violations = self.repair_genome(&mut copy, bounds, compat);
        (copy, violations)
    }

    pub fn repair_tls(&self, gene: &mut TlsGene, bounds: &Bounds, groups: &[CompatibilityGroup]) -> u32 {
        let mut violations = 0;

        // 1-2. Grille puis bornes
        for phase in gene.phases.iter_mut() {
            for kind in DurationKind::ALL {
                let (lo, hi) = bounds.range(kind);
                let slot = phase.get_mut(kind);
                *slot = clamp(quantize(*slot, self.granularity), lo, hi);
            }
        }

        // 3. Compatibilité : on ne garde que la première approche si aucun groupe ne couvre l'ensemble
        for phase in gene.phases.iter_mut() {
            let distinct = dedup_preserving(&phase.active_approaches);
            let covered = groups
                .iter()
                .any(|g| distinct.iter().all(|a| g.contains(a)));
            let compatible = validate_compatibility(&gene.tls_id, &distinct, groups).is_ok();

            if distinct.len() > 1 && (!covered || !compatible) {
                trace!("[{}] phase incompatible {:?}, troncature", gene.tls_id, distinct);
                phase.active_approaches = distinct.into_iter().take(1).collect();
                violations += 1;
            } else {
                phase.active_approaches = distinct;
            }
        }

        // 4. Cycle
        violations += self.fix_cycle(gene, bounds);

        // 5. Décalage
        let cycle = gene.cycle_time();
        gene.offset = if cycle <= EPSILON || !gene.offset.is_finite() {
            0.0
        } else {
            let normalized = quantize(gene.offset.rem_euclid(cycle), self.granularity);
            if normalized >= cycle - EPSILON || normalized < 0.0 {
                0.0
            } else {
                normalized
            }
        };

        violations
    }

    /// Allonge les rouges (du dernier au premier), puis les verts, puis les jaunes
    /// jusqu'au cycle minimal ; en excès, raccourcit le dernier rouge.
    ///
    /// La cascade plafonnée est voulue : allonger le seul dernier rouge du manque
    /// complet dépasserait `max_red` dès que le manque excède sa marge.
    fn fix_cycle(&self, gene: &mut TlsGene, bounds: &Bounds) -> u32 {
        let (min_cycle, max_cycle) = bounds.cycle_range();
        let cycle = gene.cycle_time();

        if cycle < min_cycle - EPSILON {
            let mut shortfall = min_cycle - cycle;
            for kind in [DurationKind::Red, DurationKind::Green, DurationKind::Yellow] {
                let (_, hi) = bounds.range(kind);
                for phase in gene.phases.iter_mut().rev() {
                    if shortfall <= EPSILON {
                        break;
                    }
                    let slot = phase.get_mut(kind);
                    let take = (hi - *slot).max(0.0).min(shortfall);
                    *slot += take;
                    shortfall -= take;
                }
            }
            if shortfall > EPSILON {
                trace!("[{}] cycle trop court, reliquat {:.2}s", gene.tls_id, shortfall);
                return 2;
            }
            return 1;
        }

        if cycle > max_cycle + EPSILON {
            let excess = cycle - max_cycle;
            if let Some(last) = gene.phases.last_mut() {
                last.red = (last.red - excess).max(bounds.min_red);
            }
            if gene.cycle_time() > max_cycle + EPSILON {
                trace!("[{}] cycle trop long après réduction du dernier rouge", gene.tls_id);
                return 2;
            }
            return 1;
        }

        0
    }
}

// --- Tests Unitaires ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::tls::{validate_ranges, PhaseGene};

    fn groups() -> Vec<CompatibilityGroup> {
        vec![
            vec!["N".to_string(), "S".to_string()],
            vec!["E".to_string(), "W".to_string()],
        ]
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(12.26, 0.5), 12.5);
        assert_eq!(quantize(12.24, 0.5), 12.0);
        assert_eq!(quantize(12.26, 0.0), 12.26);
    }

    #[test]
    fn test_valid_gene_untouched() {
        let mut gene = TlsGene::new(
            "J1",
            5.0,
            vec![
                PhaseGene::new(["N", "S"], 12.0, 3.0, 1.0),
                PhaseGene::new(["E", "W"], 12.0, 3.0, 1.0),
            ],
        );
        let before = gene.clone();
        let v = FeasibilityRepair::default().repair_tls(&mut gene, &Bounds::default(), &groups());

        assert_eq!(v, 0);
        assert_eq!(gene, before);
        assert_eq!(gene.offset, 5.0);
    }

    #[test]
    fn test_clamp_is_not_a_violation() {
        let mut gene = TlsGene::new("J1", 0.0, vec![PhaseGene::new(["N"], 90.0, 0.4, -3.0)]);
        let v = FeasibilityRepair::default().repair_tls(&mut gene, &Bounds::default(), &[]);

        assert_eq!(v, 0);
        assert_eq!(gene.phases[0].green, 60.0);
        assert_eq!(gene.phases[0].yellow, 2.0);
        assert_eq!(gene.phases[0].red, 0.0);
    }

    #[test]
    fn test_incompatible_phase_truncated() {
        let mut gene = TlsGene::new(
            "J1",
            0.0,
            vec![
                PhaseGene::new(["N", "E"], 12.0, 3.0, 1.0),
                PhaseGene::new(["S"], 12.0, 3.0, 1.0),
            ],
        );
        let v = FeasibilityRepair::default().repair_tls(&mut gene, &Bounds::default(), &groups());

        assert!(v >= 1);
        assert_eq!(gene.phases[0].active_approaches, vec!["N".to_string()]);
        assert_eq!(gene.phases[1].active_approaches, vec!["S".to_string()]);
    }

    #[test]
    fn test_short_cycle_extends_last_red_first() {
        // cycle = 5+2+0 + 5+2+0 = 14 < 20
        let mut gene = TlsGene::new(
            "J1",
            0.0,
            vec![
                PhaseGene::new(["N"], 5.0, 2.0, 0.0),
                PhaseGene::new(["E"], 5.0, 2.0, 0.0),
            ],
        );
        let v = FeasibilityRepair::default().repair_tls(&mut gene, &Bounds::default(), &[]);

        assert_eq!(v, 1);
        assert_eq!(gene.phases[1].red, 6.0);
        assert_eq!(gene.phases[0].red, 0.0);
        assert_eq!(gene.cycle_time(), 20.0);
    }

    #[test]
    fn test_short_cycle_cascades() {
        // Un seul rouge, max_red = 10 : il faut puiser dans le vert
        let mut gene = TlsGene::new("J1", 0.0, vec![PhaseGene::new(["N"], 5.0, 2.0, 0.0)]);
        let bounds = Bounds {
            min_cycle: 30.0,
            ..Default::default()
        };
        let v = FeasibilityRepair::default().repair_tls(&mut gene, &bounds, &[]);

        assert_eq!(v, 1);
        assert_eq!(gene.phases[0].red, bounds.max_red);
        assert_eq!(gene.phases[0].green, 18.0);
        assert_eq!(gene.cycle_time(), 30.0);
    }

    #[test]
    fn test_long_cycle_shrinks_last_red() {
        let bounds = Bounds {
            max_cycle: 60.0,
            ..Default::default()
        };
        let mut gene = TlsGene::new(
            "J1",
            0.0,
            vec![
                PhaseGene::new(["N"], 30.0, 3.0, 2.0),
                PhaseGene::new(["E"], 25.0, 3.0, 4.0),
            ],
        );
        // cycle = 67, excès 7 : le dernier rouge tombe à 0 (min_red), reste 63 > 60
        let v = FeasibilityRepair::default().repair_tls(&mut gene, &bounds, &[]);
        assert_eq!(gene.phases[1].red, 0.0);
        assert_eq!(v, 2);

        let mut gene = TlsGene::new("J1", 0.0, vec![PhaseGene::new(["N"], 55.0, 3.0, 5.0)]);
        let v = FeasibilityRepair::default().repair_tls(&mut gene, &bounds, &[]);
        assert_eq!(v, 1);
        assert_eq!(gene.phases[0].red, 2.0);
        assert_eq!(gene.cycle_time(), 60.0);
    }

    #[test]
    fn test_residual_cycle_reported_on_every_pass() {
        let bounds = Bounds {
            max_cycle: 60.0,
            ..Default::default()
        };
        let mut gene = TlsGene::new(
            "J1",
            0.0,
            vec![
                PhaseGene::new(["N"], 30.0, 3.0, 2.0),
                PhaseGene::new(["E"], 25.0, 3.0, 4.0),
            ],
        );
        let repair = FeasibilityRepair::default();

        assert_eq!(repair.repair_tls(&mut gene, &bounds, &[]), 2);
        let once = gene.clone();

        // Point fixe, mais le reliquat reste pénalisé
        assert_eq!(repair.repair_tls(&mut gene, &bounds, &[]), 2);
        assert_eq!(gene, once);
        assert!(validate_ranges(&gene, &bounds).is_err());
    }

    #[test]
    fn test_offset_normalized() {
        let phases = vec![
            PhaseGene::new(["N"], 12.0, 3.0, 1.0),
            PhaseGene::new(["E"], 12.0, 3.0, 1.0),
        ];
        let repair = FeasibilityRepair::default();

        let mut gene = TlsGene::new("J1", 37.2, phases.clone());
        repair.repair_tls(&mut gene, &Bounds::default(), &[]);
        assert_eq!(gene.offset, 5.0);

        let mut gene = TlsGene::new("J1", -1.0, phases.clone());
        repair.repair_tls(&mut gene, &Bounds::default(), &[]);
        assert_eq!(gene.offset, 31.0);

        // 31.9 s'arrondit à 32 = cycle : retour à 0
        let mut gene = TlsGene::new("J1", 31.9, phases);
        repair.repair_tls(&mut gene, &Bounds::default(), &[]);
        assert_eq!(gene.offset, 0.0);
    }

    #[test]
    fn test_repair_output_is_valid_and_idempotent() {
        let mut genome = Genome::new();
        genome.insert(
            "J1".into(),
            TlsGene::new(
                "J1",
                -44.3,
                vec![
                    PhaseGene::new(["N", "E", "N"], 71.3, 0.2, 13.7),
                    PhaseGene::new(["W"], f64::NAN, 9.0, -2.0),
                ],
            ),
        );
        let bounds = BoundsMap::default();
        let compat = CompatibilityMap::new().with_groups("J1", groups());
        let repair = FeasibilityRepair::default();

        let (once, v1) = repair.repaired(&genome, &bounds, &compat);
        assert!(v1 >= 1);
        for (id, gene) in &once {
            assert!(validate_ranges(gene, bounds.for_tls(id)).is_ok());
            for phase in &gene.phases {
                assert!(validate_compatibility(id, &phase.active_approaches, compat.groups(id)).is_ok());
            }
        }

        let (twice, v2) = repair.repaired(&once, &bounds, &compat);
        assert_eq!(twice, once);
        assert_eq!(v2, 0);
    }
}
