use std::io::Write;

use tempfile::Builder;

use portion_optimizer_rs::catalog::{load_catalog, FoodCatalog, SEARCH_LIMIT};
use portion_optimizer_rs::models::{FoodSelection, Nutrients, PortionRequest};
use portion_optimizer_rs::optimizer::{calculate_portions, AugmentedLagrangianSolver, OptimizerConfig};

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_spreadsheet_catalog_feeds_the_optimizer() {
    let csv = "identificador,alimento,Quantidade,Calorias,Proteínas,Carboidratos,Gorduras\n\
               ARROZ_BRANCO,Arroz branco cozido,100,128,2.5,28.1,0.2\n\
               FEIJAO_CARIOCA,Feijão carioca cozido,100,76,4.8,13.6,0.5\n\
               PEITO_FRANGO,Peito de frango grelhado,100,159,32,0,2.5\n";
    let file = write_temp(".csv", csv);

    let catalog = FoodCatalog::new(load_catalog(file.path()).unwrap());
    assert_eq!(catalog.len(), 3);

    let request = PortionRequest {
        targets: Nutrients::new(450.0, 45.0, 45.0, 0.0),
        tolerance: Some(0.10),
        foods: vec![
            FoodSelection::new("arroz_branco"),
            FoodSelection::new("FEIJAO_CARIOCA"),
            FoodSelection::new("PEITO_FRANGO").with_bounds(None, Some(200.0)),
        ],
    };

    let config = OptimizerConfig::default();
    let solver = AugmentedLagrangianSolver::new(config.solver.clone());
    let portions = calculate_portions(&request, &catalog, &solver, &config).unwrap();

    assert_eq!(portions.len(), 3);
    assert_eq!(portions[0].code, "ARROZ_BRANCO");
    assert!(portions[2].quantity <= 200.0 + 1e-9);
}

#[test]
fn test_user_foods_shadow_shared_catalog() {
    let shared = write_temp(
        ".json",
        r#"[
            {"code": "PAO", "name": "Bread", "quantity": 50, "calories": 135, "protein": 4.5, "carb": 25, "fat": 1.5},
            {"code": "QUEIJO", "name": "Cheese", "quantity": 30, "calories": 96, "protein": 7, "carb": 0.5, "fat": 7.5}
        ]"#,
    );
    let user = write_temp(
        ".json",
        r#"[
            {"code": "pao", "name": "Homemade bread", "quantity": 100, "calories": 250, "protein": 9, "carb": 48, "fat": 3}
        ]"#,
    );

    let catalog = FoodCatalog::new(load_catalog(shared.path()).unwrap())
        .with_overrides(load_catalog(user.path()).unwrap());

    assert_eq!(catalog.len(), 2);
    assert!(catalog.is_override("PAO"));
    assert_eq!(catalog.get("PAO").unwrap().name, "Homemade bread");
    assert_eq!(catalog.get("queijo").unwrap().name, "Cheese");
}

#[test]
fn test_search_by_code_fragment() {
    let shared = write_temp(
        ".json",
        r#"[
            {"code": "ARROZ_BRANCO", "quantity": 100, "calories": 128, "protein": 2.5, "carb": 28.1, "fat": 0.2},
            {"code": "ARROZ_INTEGRAL", "quantity": 100, "calories": 124, "protein": 2.6, "carb": 25.8, "fat": 1.0},
            {"code": "BATATA_DOCE", "quantity": 100, "calories": 77, "protein": 0.6, "carb": 18.4, "fat": 0.1}
        ]"#,
    );
    let catalog = FoodCatalog::new(load_catalog(shared.path()).unwrap());

    let hits = catalog.search("arroz", SEARCH_LIMIT);
    let codes: Vec<&str> = hits.iter().map(|f| f.code.as_str()).collect();
    assert_eq!(codes, vec!["ARROZ_BRANCO", "ARROZ_INTEGRAL"]);

    assert_eq!(catalog.search("arroz", 1).len(), 1);
    assert!(catalog.search("b", SEARCH_LIMIT).is_empty());
}
