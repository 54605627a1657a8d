fn main() {
    uniffi::generate_scaffolding("src/callview.udl").unwrap();
}
