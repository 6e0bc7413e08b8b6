use serde::Serialize;
use virtuoso_core::{
    config::{AppConfig, LoadOptions},
    Catalog,
};

use crate::commands::load_catalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(options: LoadOptions, json_output: bool) -> String {
    let report = build_report(options);

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report(options: LoadOptions) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(options) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            match load_catalog(&config) {
                Ok(catalog) => {
                    checks.push(DoctorCheck {
                        name: "catalog_load",
                        status: CheckStatus::Pass,
                        details: match &config.catalog.path {
                            Some(path) => format!("loaded from `{}`", path.display()),
                            None => "using built-in garments".to_string(),
                        },
                    });
                    checks.push(check_catalog_integrity(&catalog));
                }
                Err(error) => {
                    checks.push(DoctorCheck {
                        name: "catalog_load",
                        status: CheckStatus::Fail,
                        details: error.to_string(),
                    });
                    checks.push(skipped("catalog_integrity", "catalog did not load"));
                }
            }
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            checks.push(skipped("catalog_load", "configuration did not load"));
            checks.push(skipped("catalog_integrity", "configuration did not load"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck {
        name,
        status: CheckStatus::Skipped,
        details: format!("skipped because {reason}"),
    }
}

fn check_catalog_integrity(catalog: &Catalog) -> DoctorCheck {
    if catalog.is_empty() {
        return DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Fail,
            details: "catalog has no products".to_string(),
        };
    }

    let problems = catalog
        .products()
        .iter()
        .filter_map(|product| {
            if product.unit_price == 0 {
                Some(format!("`{}` has a zero price", product.id))
            } else if product.name.trim().is_empty() {
                Some(format!("`{}` has no name", product.id))
            } else if product.display_price.trim().is_empty() {
                Some(format!("`{}` has no display price", product.id))
            } else {
                None
            }
        })
        .collect::<Vec<_>>();

    if problems.is_empty() {
        DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Pass,
            details: format!("{} product(s) with unique ids and prices", catalog.len()),
        }
    } else {
        DoctorCheck {
            name: "catalog_integrity",
            status: CheckStatus::Fail,
            details: problems.join("; "),
        }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use virtuoso_core::{Catalog, Product, ProductId};

    use super::{check_catalog_integrity, CheckStatus};

    #[test]
    fn seeded_catalog_is_healthy() {
        let check = check_catalog_integrity(&Catalog::seeded());
        assert_eq!(check.status, CheckStatus::Pass);
    }

    #[test]
    fn zero_price_fails_integrity() {
        let catalog = Catalog::new(vec![Product {
            id: ProductId::new("free"),
            name: "Носки".to_string(),
            category: "Аксессуары".to_string(),
            color: "Серый".to_string(),
            unit_price: 0,
            display_price: "0 ₽".to_string(),
        }])
        .expect("single product catalog");

        let check = check_catalog_integrity(&catalog);
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.details.contains("`free`"));
    }

    #[test]
    fn empty_catalog_fails_integrity() {
        let check = check_catalog_integrity(&Catalog::default());
        assert_eq!(check.status, CheckStatus::Fail);
    }
}
