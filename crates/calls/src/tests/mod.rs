//! Unit-Tests fuer die Raum- und Anruf-Dienste
